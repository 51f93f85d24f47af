//! One bounded local search over the nonlinear parameters.
//!
//! The scalar objective for a trial (tc, m, w) is the residual sum of
//! squares returned by the linear solve; singular systems score +inf so the
//! simplex drifts away from degenerate candidates. Local search is enough
//! here because each call is cheap and the restart policy supplies global
//! coverage.

use crate::errors::{validate_parameter, LpplsResult};
use crate::linear_solver::solve_linear;
use crate::model::NonlinearParams;
use crate::observations::ObservationWindow;
use crate::optimizer::{nelder_mead, NelderMeadOptions, ParamBox};
use crate::rng::FitRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Search bounds for the nonlinear parameters, expressed relative to the
/// observation window.
///
/// The critical time is constrained to lie after the last observation and
/// before a configurable multiple of the window length beyond it; the
/// exponent stays strictly inside (0, 1) with small margins to avoid
/// degeneracy; the log-frequency stays inside its empirical band.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchBounds {
    /// Lower tc offset beyond the window end, as a fraction of the window
    /// length.
    pub tc_lower_frac: f64,
    /// Upper tc offset beyond the window end, as a fraction of the window
    /// length.
    pub tc_upper_frac: f64,
    /// Exponent bounds, strictly inside (0, 1).
    pub m_range: (f64, f64),
    /// Angular log-frequency band.
    pub w_range: (f64, f64),
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            tc_lower_frac: 0.01,
            tc_upper_frac: 0.5,
            m_range: (0.01, 0.99),
            w_range: (4.0, 25.0),
        }
    }
}

impl SearchBounds {
    /// Validate the bound ranges.
    pub fn validate(&self) -> LpplsResult<()> {
        validate_parameter(self.tc_lower_frac, 0.0, self.tc_upper_frac, "tc_lower_frac")?;
        validate_parameter(self.tc_upper_frac, self.tc_lower_frac, 10.0, "tc_upper_frac")?;
        validate_parameter(self.m_range.0, 0.0, self.m_range.1, "m lower bound")?;
        validate_parameter(self.m_range.1, self.m_range.0, 1.0, "m upper bound")?;
        validate_parameter(self.w_range.0, 0.0, self.w_range.1, "w lower bound")?;
        validate_parameter(self.w_range.1, self.w_range.0, f64::INFINITY, "w upper bound")?;
        Ok(())
    }

    /// Resolve the relative bounds into an absolute feasible box for the
    /// given window.
    pub fn resolve(&self, window: &ObservationWindow<'_>) -> ParamBox {
        let span = window.time_span();
        let t_last = window.t_last();
        ParamBox {
            bounds: [
                (
                    t_last + self.tc_lower_frac * span,
                    t_last + self.tc_upper_frac * span,
                ),
                self.m_range,
                self.w_range,
            ],
        }
    }
}

/// The candidate produced by one restart attempt.
#[derive(Debug, Clone, Copy)]
pub struct SearchAttempt {
    /// Final nonlinear parameters.
    pub params: NonlinearParams,
    /// Residual sum of squares at the final point.
    pub rss: f64,
    /// Whether the simplex met its convergence criteria.
    pub converged: bool,
}

/// Draw one uniform initial guess inside the feasible box.
pub fn draw_initial_guess(rng: &mut FitRng, feasible: &ParamBox) -> NonlinearParams {
    let [tc_bounds, m_bounds, w_bounds] = feasible.bounds;
    NonlinearParams {
        tc: rng.uniform(tc_bounds.0, tc_bounds.1),
        m: rng.uniform(m_bounds.0, m_bounds.1),
        w: rng.uniform(w_bounds.0, w_bounds.1),
    }
}

/// Run one bounded local minimization from the supplied initial guess.
pub fn run_search(
    window: &ObservationWindow<'_>,
    feasible: &ParamBox,
    options: &NelderMeadOptions,
    initial: NonlinearParams,
) -> SearchAttempt {
    let objective = |x: &[f64; 3]| {
        let trial = NonlinearParams {
            tc: x[0],
            m: x[1],
            w: x[2],
        };
        match solve_linear(window, &trial) {
            Ok((_, rss)) => rss,
            Err(_) => f64::INFINITY,
        }
    };

    let outcome = nelder_mead(objective, [initial.tc, initial.m, initial.w], feasible, options);

    SearchAttempt {
        params: NonlinearParams {
            tc: outcome.x[0],
            m: outcome.x[1],
            w: outcome.x[2],
        },
        rss: outcome.value,
        converged: outcome.converged && outcome.value.is_finite(),
    }
}
