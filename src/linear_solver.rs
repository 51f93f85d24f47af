//! Ordinary least-squares solve for the linear LPPLS coefficients.
//!
//! For a trial (tc, m, w) the basis matrix has one row per observation and
//! four columns. The 4x4 normal equations are accumulated in a single pass
//! and solved with a Cholesky factorization, falling back to LU when the
//! Gram matrix is merely indefinite to roundoff. Near-rank-deficiency (tc
//! too close to the window end, or w collapsing the oscillatory columns)
//! surfaces as [`LpplsAnalysisError::SingularSystem`], which the search
//! treats as "candidate rejected" rather than a failure of the fit.

use crate::errors::{LpplsAnalysisError, LpplsResult};
use crate::model::{basis_row, LinearParams, NonlinearParams};
use crate::observations::ObservationWindow;
use nalgebra::{Matrix4, Vector4};

/// Relative tolerance on the Gram matrix diagonal for rank detection.
const GRAM_RANK_EPSILON: f64 = 1e3 * f64::EPSILON;

/// Solve the linear sub-problem for a trial set of nonlinear parameters.
///
/// Returns the least-squares coefficients and the residual sum of squares
/// over the window.
///
/// # Errors
/// [`LpplsAnalysisError::SingularSystem`] when the basis matrix is
/// (near-)rank-deficient or the candidate places tc inside the window.
pub fn solve_linear(
    window: &ObservationWindow<'_>,
    params: &NonlinearParams,
) -> LpplsResult<(LinearParams, f64)> {
    let times = window.times();
    let prices = window.log_prices();

    // Accumulate the normal equations A'A x = A'y in one pass.
    let mut gram = Matrix4::<f64>::zeros();
    let mut rhs = Vector4::<f64>::zeros();

    for (&t, &y) in times.iter().zip(prices) {
        let row = basis_row(t, params).ok_or_else(|| LpplsAnalysisError::SingularSystem {
            reason: format!("critical time {} not beyond observation at t = {}", params.tc, t),
        })?;
        for i in 0..4 {
            rhs[i] += row[i] * y;
            for j in 0..4 {
                gram[(i, j)] += row[i] * row[j];
            }
        }
    }

    if !gram.iter().all(|v| v.is_finite()) || !rhs.iter().all(|v| v.is_finite()) {
        return Err(LpplsAnalysisError::SingularSystem {
            reason: "non-finite accumulation in normal equations".to_string(),
        });
    }

    // A vanishing diagonal entry means a basis column has collapsed, e.g.
    // (tc - t)^m underflowing when tc hugs the window end.
    let scale = gram.diagonal().amax();
    if scale <= 0.0 || gram.diagonal().iter().any(|&d| d < GRAM_RANK_EPSILON * scale) {
        return Err(LpplsAnalysisError::SingularSystem {
            reason: "basis column collapsed (rank-deficient Gram matrix)".to_string(),
        });
    }

    let solution = match gram.cholesky() {
        Some(chol) => chol.solve(&rhs),
        None => {
            // Roundoff can push a barely-positive-definite Gram matrix
            // indefinite; LU still solves those.
            match gram.lu().solve(&rhs) {
                Some(x) => x,
                None => {
                    return Err(LpplsAnalysisError::SingularSystem {
                        reason: "Gram matrix factorization failed".to_string(),
                    })
                }
            }
        }
    };

    if !solution.iter().all(|v| v.is_finite()) {
        return Err(LpplsAnalysisError::SingularSystem {
            reason: "non-finite least-squares solution".to_string(),
        });
    }

    let linear = LinearParams {
        a: solution[0],
        b: solution[1],
        c1: solution[2],
        c2: solution[3],
    };

    let rss = residual_sum_of_squares(window, params, &linear)?;
    Ok((linear, rss))
}

/// Residual sum of squares of the model against the window.
pub fn residual_sum_of_squares(
    window: &ObservationWindow<'_>,
    params: &NonlinearParams,
    linear: &LinearParams,
) -> LpplsResult<f64> {
    let mut rss = 0.0;
    for (&t, &y) in window.times().iter().zip(window.log_prices()) {
        let row = basis_row(t, params).ok_or_else(|| LpplsAnalysisError::SingularSystem {
            reason: format!("critical time {} not beyond observation at t = {}", params.tc, t),
        })?;
        let fitted = linear.a * row[0] + linear.b * row[1] + linear.c1 * row[2] + linear.c2 * row[3];
        let residual = y - fitted;
        rss += residual * residual;
    }
    if !rss.is_finite() {
        return Err(LpplsAnalysisError::SingularSystem {
            reason: "non-finite residual sum of squares".to_string(),
        });
    }
    Ok(rss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::float_ops::approx_eq_eps;
    use crate::model::lppls_value;
    use crate::observations::ObservationSeries;

    fn synthetic_series(nl: &NonlinearParams, lin: &LinearParams, n: usize) -> ObservationSeries {
        let times: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let prices: Vec<f64> = times
            .iter()
            .map(|&t| lppls_value(t, nl, lin).unwrap())
            .collect();
        ObservationSeries::from_rows(times, prices).unwrap()
    }

    #[test]
    fn test_exact_recovery_on_noiseless_data() {
        let nl = NonlinearParams {
            tc: 260.0,
            m: 0.5,
            w: 8.0,
        };
        let lin = LinearParams {
            a: 2.0,
            b: -1.0,
            c1: -0.3,
            c2: 0.15,
        };
        let series = synthetic_series(&nl, &lin, 250);
        let window = series.full_window();

        let (solved, rss) = solve_linear(&window, &nl).unwrap();
        assert!(approx_eq_eps(solved.a, lin.a, 1e-6));
        assert!(approx_eq_eps(solved.b, lin.b, 1e-6));
        assert!(approx_eq_eps(solved.c1, lin.c1, 1e-6));
        assert!(approx_eq_eps(solved.c2, lin.c2, 1e-6));
        assert!(rss < 1e-12);
    }

    #[test]
    fn test_rejects_tc_inside_window() {
        let nl = NonlinearParams {
            tc: 260.0,
            m: 0.5,
            w: 8.0,
        };
        let lin = LinearParams {
            a: 0.0,
            b: -1.0,
            c1: 0.1,
            c2: 0.1,
        };
        let series = synthetic_series(&nl, &lin, 250);
        let window = series.full_window();

        let inside = NonlinearParams {
            tc: 100.0,
            m: 0.5,
            w: 8.0,
        };
        assert!(matches!(
            solve_linear(&window, &inside),
            Err(LpplsAnalysisError::SingularSystem { .. })
        ));
    }

    #[test]
    fn test_degenerate_exponent_is_singular() {
        // m = 0 makes the power-law column a constant, collinear with the
        // intercept column.
        let nl = NonlinearParams {
            tc: 260.0,
            m: 0.5,
            w: 8.0,
        };
        let lin = LinearParams {
            a: 1.0,
            b: -0.5,
            c1: 0.05,
            c2: 0.05,
        };
        let series = synthetic_series(&nl, &lin, 250);
        let window = series.full_window();

        let degenerate = NonlinearParams {
            tc: 260.0,
            m: 0.0,
            w: 8.0,
        };
        // Either an explicit singular error or a huge condition number is
        // acceptable here; the search only needs the candidate rejected or
        // scored, never a panic.
        let outcome = solve_linear(&window, &degenerate);
        if let Ok((_, rss)) = outcome {
            assert!(rss.is_finite());
        }
    }

    #[test]
    fn test_residual_matches_manual_computation() {
        let nl = NonlinearParams {
            tc: 260.0,
            m: 0.6,
            w: 6.0,
        };
        let lin = LinearParams {
            a: 1.0,
            b: -0.8,
            c1: 0.2,
            c2: -0.1,
        };
        let series = synthetic_series(&nl, &lin, 250);
        let window = series.full_window();

        let off = LinearParams {
            a: 1.0,
            b: -0.8,
            c1: 0.2,
            c2: 0.0,
        };
        let rss = residual_sum_of_squares(&window, &nl, &off).unwrap();
        let manual: f64 = window
            .times()
            .iter()
            .zip(window.log_prices())
            .map(|(&t, &y)| {
                let fitted = lppls_value(t, &nl, &off).unwrap();
                (y - fitted) * (y - fitted)
            })
            .sum();
        assert!(approx_eq_eps(rss, manual, 1e-10));
    }
}
