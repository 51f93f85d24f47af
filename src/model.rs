//! The log-periodic power law singularity (LPPLS) model.
//!
//! The canonical form `A + B (tc-t)^m (1 + C cos(w ln(tc-t) - phi))` is
//! reparameterized so that the amplitude terms enter linearly:
//!
//! ```text
//! f(t) = a + (tc-t)^m * (b + c1 cos(w ln(tc-t)) + c2 sin(w ln(tc-t)))
//! ```
//!
//! For fixed (tc, m, w) the remaining coefficients (a, b, c1, c2) are the
//! solution of an ordinary least-squares problem; this split is what makes
//! the restart search cheap. Everything in this module is a pure function of
//! its arguments.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nonlinear model parameters searched by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NonlinearParams {
    /// Critical time: the predicted singularity, beyond the observed window.
    pub tc: f64,
    /// Power-law exponent, inside (0, 1).
    pub m: f64,
    /// Angular log-frequency of the oscillation.
    pub w: f64,
}

/// Linear model coefficients solved analytically for fixed (tc, m, w).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearParams {
    /// Intercept.
    pub a: f64,
    /// Power-law amplitude. Negative b is the bubble (upward) regime.
    pub b: f64,
    /// Cosine amplitude.
    pub c1: f64,
    /// Sine amplitude.
    pub c2: f64,
}

impl LinearParams {
    /// Combined oscillation amplitude `sqrt(c1^2 + c2^2)`.
    pub fn amplitude(&self) -> f64 {
        self.c1.hypot(self.c2)
    }
}

/// The linear basis row `[1, g, g cos(w ln(tc-t)), g sin(w ln(tc-t))]` with
/// `g = (tc-t)^m`.
///
/// Returns `None` when `tc <= t`: the model is undefined at or past the
/// critical time, so such a candidate is simply rejected.
pub fn basis_row(t: f64, params: &NonlinearParams) -> Option<[f64; 4]> {
    let dt = params.tc - t;
    if dt <= 0.0 {
        return None;
    }
    let log_dt = dt.ln();
    let g = dt.powf(params.m);
    let phase = params.w * log_dt;
    Some([1.0, g, g * phase.cos(), g * phase.sin()])
}

/// Evaluate the model at time `t`.
///
/// Returns `None` when `tc <= t`.
pub fn lppls_value(t: f64, nonlinear: &NonlinearParams, linear: &LinearParams) -> Option<f64> {
    let row = basis_row(t, nonlinear)?;
    Some(linear.a * row[0] + linear.b * row[1] + linear.c1 * row[2] + linear.c2 * row[3])
}
