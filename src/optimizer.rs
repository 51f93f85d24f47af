//! Bounded Nelder-Mead simplex minimization.
//!
//! A compact derivative-free local minimizer over a 3-dimensional box,
//! sized for the (tc, m, w) sub-problem: each objective evaluation is an
//! analytic linear solve, so the search runs thousands of evaluations per
//! second and global coverage comes from independent restarts rather than
//! from a global solver. Trial points are clamped into the box; the
//! standard reflection/expansion/contraction/shrink moves apply otherwise.

use crate::errors::{validate_parameter, LpplsResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dimensionality of the nonlinear sub-problem.
pub const DIM: usize = 3;

/// Rectangular feasible region for the nonlinear parameters.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParamBox {
    /// Per-coordinate (lower, upper) bounds.
    pub bounds: [(f64, f64); DIM],
}

impl ParamBox {
    /// Clamp a point into the box.
    pub fn clamp(&self, x: &mut [f64; DIM]) {
        for (value, &(lo, hi)) in x.iter_mut().zip(self.bounds.iter()) {
            *value = value.clamp(lo, hi);
        }
    }

    /// Whether a point lies inside the box.
    pub fn contains(&self, x: &[f64; DIM]) -> bool {
        x.iter()
            .zip(self.bounds.iter())
            .all(|(&v, &(lo, hi))| v >= lo && v <= hi)
    }

    /// Width of each coordinate interval.
    pub fn widths(&self) -> [f64; DIM] {
        let mut widths = [0.0; DIM];
        for (w, &(lo, hi)) in widths.iter_mut().zip(self.bounds.iter()) {
            *w = hi - lo;
        }
        widths
    }
}

/// Termination controls for the simplex search.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NelderMeadOptions {
    /// Iteration cap; the search reports `converged = false` when hit.
    pub max_iterations: usize,
    /// Convergence tolerance on the objective spread across the simplex.
    pub f_tolerance: f64,
    /// Convergence tolerance on the simplex extent, relative to box widths.
    pub x_tolerance: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 600,
            f_tolerance: 1e-10,
            x_tolerance: 1e-8,
        }
    }
}

impl NelderMeadOptions {
    /// Validate the termination controls.
    ///
    /// A zero iteration cap is allowed; it degrades every attempt to
    /// `converged = false` instead of erroring.
    pub fn validate(&self) -> LpplsResult<()> {
        validate_parameter(self.f_tolerance, 0.0, f64::INFINITY, "f_tolerance")?;
        validate_parameter(self.x_tolerance, 0.0, f64::INFINITY, "x_tolerance")?;
        Ok(())
    }
}

/// Outcome of one simplex minimization.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOutcome {
    /// Best point found.
    pub x: [f64; DIM],
    /// Objective value at the best point.
    pub value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Objective evaluations performed.
    pub evaluations: usize,
    /// Whether both tolerance criteria were met within the iteration cap.
    pub converged: bool,
}

// Standard Nelder-Mead coefficients.
const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const RHO: f64 = 0.5; // contraction
const SIGMA: f64 = 0.5; // shrink

/// Minimize `objective` over `feasible` starting from `x0`.
///
/// The objective may return non-finite values for rejected candidates;
/// those vertices rank worst and the simplex moves away from them. The
/// initial point is clamped into the box.
pub fn nelder_mead<F>(
    mut objective: F,
    x0: [f64; DIM],
    feasible: &ParamBox,
    options: &NelderMeadOptions,
) -> SimplexOutcome
where
    F: FnMut(&[f64; DIM]) -> f64,
{
    let mut evaluations = 0usize;
    let mut eval = |x: &[f64; DIM], count: &mut usize| -> f64 {
        *count += 1;
        let v = objective(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let widths = feasible.widths();

    // Initial simplex: x0 plus one perturbed vertex per coordinate, all
    // clamped into the box. Perturbation is 5% of the coordinate width,
    // flipped inward when it would leave the box.
    let mut start = x0;
    feasible.clamp(&mut start);

    let mut simplex: Vec<[f64; DIM]> = Vec::with_capacity(DIM + 1);
    simplex.push(start);
    for i in 0..DIM {
        let mut vertex = start;
        let step = 0.05 * widths[i];
        let (lo, hi) = feasible.bounds[i];
        vertex[i] = if start[i] + step <= hi {
            start[i] + step
        } else {
            (start[i] - step).max(lo)
        };
        simplex.push(vertex);
    }

    let mut values: Vec<f64> = simplex.iter().map(|x| eval(x, &mut evaluations)).collect();

    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < options.max_iterations {
        iterations += 1;

        // Order vertices best -> worst.
        let mut order: Vec<usize> = (0..=DIM).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let sorted_simplex: Vec<[f64; DIM]> = order.iter().map(|&i| simplex[i]).collect();
        let sorted_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        simplex = sorted_simplex;
        values = sorted_values;

        // Convergence: objective spread and simplex extent both small.
        let f_spread = if values[DIM].is_finite() {
            values[DIM] - values[0]
        } else {
            f64::INFINITY
        };
        let x_extent = (0..DIM)
            .map(|i| {
                let spread = (1..=DIM)
                    .map(|v| (simplex[v][i] - simplex[0][i]).abs())
                    .fold(0.0f64, f64::max);
                if widths[i] > 0.0 {
                    spread / widths[i]
                } else {
                    0.0
                }
            })
            .fold(0.0f64, f64::max);
        if values[0].is_finite() && f_spread <= options.f_tolerance && x_extent <= options.x_tolerance
        {
            converged = true;
            break;
        }

        // Centroid of all but the worst vertex.
        let mut centroid = [0.0; DIM];
        for vertex in simplex.iter().take(DIM) {
            for i in 0..DIM {
                centroid[i] += vertex[i] / DIM as f64;
            }
        }

        let worst = simplex[DIM];
        let mut reflected = [0.0; DIM];
        for i in 0..DIM {
            reflected[i] = centroid[i] + ALPHA * (centroid[i] - worst[i]);
        }
        feasible.clamp(&mut reflected);
        let f_reflected = eval(&reflected, &mut evaluations);

        if f_reflected < values[0] {
            // Try to expand past the reflected point.
            let mut expanded = [0.0; DIM];
            for i in 0..DIM {
                expanded[i] = centroid[i] + GAMMA * (reflected[i] - centroid[i]);
            }
            feasible.clamp(&mut expanded);
            let f_expanded = eval(&expanded, &mut evaluations);
            if f_expanded < f_reflected {
                simplex[DIM] = expanded;
                values[DIM] = f_expanded;
            } else {
                simplex[DIM] = reflected;
                values[DIM] = f_reflected;
            }
        } else if f_reflected < values[DIM - 1] {
            simplex[DIM] = reflected;
            values[DIM] = f_reflected;
        } else {
            // Contract toward the better of worst/reflected.
            let (anchor, f_anchor) = if f_reflected < values[DIM] {
                (reflected, f_reflected)
            } else {
                (worst, values[DIM])
            };
            let mut contracted = [0.0; DIM];
            for i in 0..DIM {
                contracted[i] = centroid[i] + RHO * (anchor[i] - centroid[i]);
            }
            feasible.clamp(&mut contracted);
            let f_contracted = eval(&contracted, &mut evaluations);

            if f_contracted < f_anchor {
                simplex[DIM] = contracted;
                values[DIM] = f_contracted;
            } else {
                // Shrink toward the best vertex.
                let best = simplex[0];
                for v in 1..=DIM {
                    for i in 0..DIM {
                        simplex[v][i] = best[i] + SIGMA * (simplex[v][i] - best[i]);
                    }
                    feasible.clamp(&mut simplex[v]);
                    values[v] = eval(&simplex[v], &mut evaluations);
                }
            }
        }
    }

    // Final ordering to report the best vertex.
    let mut best_index = 0;
    for i in 1..=DIM {
        if values[i] < values[best_index] {
            best_index = i;
        }
    }

    SimplexOutcome {
        x: simplex[best_index],
        value: values[best_index],
        iterations,
        evaluations,
        converged: converged && values[best_index].is_finite(),
    }
}
