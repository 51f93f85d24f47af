//! Result structures for single fits, windowed ensembles, and the derived
//! confidence series.
//!
//! Every structure here is immutable once produced: a [`FitResult`] is owned
//! by the runner invocation that created it until it is handed to the
//! aggregation step, and the aggregate is read-only.

use crate::model::{LinearParams, NonlinearParams};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The outcome of one fit over one observation window.
///
/// `rss` is the residual sum of squares of the winning candidate (named to
/// avoid clashing with the oscillation count `oscillations`). A fit where no
/// restart converged carries `converged = false` and `rss = +inf`; such
/// sentinel results are kept in the ensemble so per-end-date totals stay
/// accurate, but they are never selected by downstream consumers.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FitResult {
    /// Critical time.
    pub tc: f64,
    /// Power-law exponent.
    pub m: f64,
    /// Angular log-frequency.
    pub w: f64,
    /// Intercept.
    pub a: f64,
    /// Power-law amplitude; the sign encodes the regime direction.
    pub b: f64,
    /// Cosine amplitude.
    pub c1: f64,
    /// Sine amplitude.
    pub c2: f64,
    /// Residual sum of squares of the winning candidate.
    pub rss: f64,
    /// Damping indicator `m |b| / (w sqrt(c1^2 + c2^2))`.
    pub damping: f64,
    /// Number of log-periodic oscillations completed over the window.
    pub oscillations: f64,
    /// Window start index (inclusive) into the parent series.
    pub window_start: usize,
    /// Window end index (exclusive) into the parent series.
    pub window_end: usize,
    /// Whether any restart attempt converged.
    pub converged: bool,
}

impl FitResult {
    /// Sentinel result for a window where no restart attempt converged.
    pub fn unconverged(window_start: usize, window_end: usize) -> Self {
        Self {
            tc: 0.0,
            m: 0.0,
            w: 0.0,
            a: 0.0,
            b: 0.0,
            c1: 0.0,
            c2: 0.0,
            rss: f64::INFINITY,
            damping: f64::INFINITY,
            oscillations: 0.0,
            window_start,
            window_end,
            converged: false,
        }
    }

    /// Combined oscillation amplitude `sqrt(c1^2 + c2^2)`.
    pub fn c(&self) -> f64 {
        self.c1.hypot(self.c2)
    }

    /// The nonlinear parameter triple.
    pub fn nonlinear(&self) -> NonlinearParams {
        NonlinearParams {
            tc: self.tc,
            m: self.m,
            w: self.w,
        }
    }

    /// The linear coefficient quadruple.
    pub fn linear(&self) -> LinearParams {
        LinearParams {
            a: self.a,
            b: self.b,
            c1: self.c1,
            c2: self.c2,
        }
    }
}

/// The windowed ensemble: one [`FitResult`] per enumerated window.
///
/// Collection order is whatever the worker pool produced; aggregation
/// regroups by window end, so order carries no meaning.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestedFitResult {
    fits: Vec<FitResult>,
}

impl NestedFitResult {
    pub(crate) fn new(fits: Vec<FitResult>) -> Self {
        Self { fits }
    }

    /// All window fits, including unconverged sentinels.
    pub fn fits(&self) -> &[FitResult] {
        &self.fits
    }

    /// Total number of window jobs, converged or not.
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    /// Whether the ensemble is empty.
    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    /// Number of converged window fits.
    pub fn converged_count(&self) -> usize {
        self.fits.iter().filter(|f| f.converged).count()
    }
}

/// Confidence and diagnostic indicators for one window end date.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfidencePoint {
    /// Window end index (exclusive) into the parent series.
    pub window_end: usize,
    /// Observed time at the window end.
    pub t_end: f64,
    /// Fraction of fits at this end date qualifying with bubble sign.
    pub confidence_up: f64,
    /// Fraction of fits at this end date qualifying with anti-bubble sign.
    pub confidence_down: f64,
    /// Median damping indicator over the qualified fits, if any qualified.
    pub median_damping: Option<f64>,
    /// Median oscillation count over the qualified fits, if any qualified.
    pub median_oscillations: Option<f64>,
    /// Total fits sharing this end date (the confidence denominator).
    pub total_fits: usize,
    /// Qualified bubble-sign fits at this end date.
    pub qualified_up: usize,
    /// Qualified anti-bubble-sign fits at this end date.
    pub qualified_down: usize,
}

/// Time-indexed confidence series, ordered by window end date.
///
/// This is the terminal analytic artifact consumed by presentation layers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfidenceSeries {
    points: Vec<ConfidencePoint>,
}

impl ConfidenceSeries {
    pub(crate) fn new(points: Vec<ConfidencePoint>) -> Self {
        Self { points }
    }

    /// The per-end-date points, ascending in end time.
    pub fn points(&self) -> &[ConfidencePoint] {
        &self.points
    }

    /// Number of distinct end dates.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconverged_sentinel_shape() {
        let sentinel = FitResult::unconverged(5, 45);
        assert!(!sentinel.converged);
        assert!(sentinel.rss.is_infinite());
        assert!(sentinel.damping.is_infinite());
        assert_eq!(sentinel.window_start, 5);
        assert_eq!(sentinel.window_end, 45);
    }

    #[test]
    fn test_c_combines_amplitudes() {
        let mut fit = FitResult::unconverged(0, 40);
        fit.c1 = 3.0;
        fit.c2 = 4.0;
        assert!((fit.c() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_nested_counts() {
        let mut converged = FitResult::unconverged(0, 40);
        converged.converged = true;
        let ensemble = NestedFitResult::new(vec![
            converged,
            FitResult::unconverged(1, 41),
            FitResult::unconverged(2, 42),
        ]);
        assert_eq!(ensemble.len(), 3);
        assert_eq!(ensemble.converged_count(), 1);
    }
}
