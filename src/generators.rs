//! Synthetic LPPLS series generation for testing and validation.
//!
//! Draws a series exactly from the model with known parameters plus
//! additive Gaussian noise. Validation of fitting methods against series
//! with known ground truth is the standard way to calibrate restart counts
//! and acceptance thresholds before touching market data.

use crate::errors::{validate_parameter, LpplsAnalysisError, LpplsResult};
use crate::model::{lppls_value, LinearParams, NonlinearParams};
use crate::observations::{ObservationSeries, MIN_OBSERVATIONS};
use crate::rng::FitRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for synthetic LPPLS series generation.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LpplsSeriesConfig {
    /// Number of observations.
    pub length: usize,
    /// Time of the first observation.
    pub t_start: f64,
    /// Spacing of the time axis.
    pub t_step: f64,
    /// Ground-truth nonlinear parameters.
    pub nonlinear: NonlinearParams,
    /// Ground-truth linear coefficients.
    pub linear: LinearParams,
    /// Standard deviation of additive Gaussian noise on the log price.
    pub noise_sigma: f64,
    /// Seed for reproducible noise; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for LpplsSeriesConfig {
    fn default() -> Self {
        Self {
            length: 500,
            t_start: 0.0,
            t_step: 1.0,
            nonlinear: NonlinearParams {
                tc: 520.0,
                m: 0.5,
                w: 8.0,
            },
            linear: LinearParams {
                a: 0.0,
                b: -1.0,
                c1: -0.3,
                c2: 0.0,
            },
            noise_sigma: 0.01,
            seed: None,
        }
    }
}

/// Generate a synthetic observation series from the exact model.
///
/// # Errors
/// [`LpplsAnalysisError`] variants for a too-short series, non-positive
/// time step, negative noise, or a critical time inside the sampled range.
pub fn generate_lppls_series(config: &LpplsSeriesConfig) -> LpplsResult<ObservationSeries> {
    if config.length < MIN_OBSERVATIONS {
        return Err(LpplsAnalysisError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: config.length,
        });
    }
    validate_parameter(config.t_step, f64::MIN_POSITIVE, f64::INFINITY, "t_step")?;
    validate_parameter(config.noise_sigma, 0.0, f64::INFINITY, "noise_sigma")?;
    validate_parameter(config.nonlinear.m, 0.0, 1.0, "m")?;

    let t_end = config.t_start + (config.length - 1) as f64 * config.t_step;
    if config.nonlinear.tc <= t_end {
        return Err(LpplsAnalysisError::InvalidParameter {
            parameter: "tc".to_string(),
            value: config.nonlinear.tc,
            constraint: format!("> last sampled time ({})", t_end),
        });
    }

    let mut rng = match config.seed {
        Some(seed) => FitRng::with_seed(seed),
        None => FitRng::from_entropy(),
    };

    let mut times = Vec::with_capacity(config.length);
    let mut prices = Vec::with_capacity(config.length);
    for i in 0..config.length {
        let t = config.t_start + i as f64 * config.t_step;
        // tc > t_end guarantees the model is defined on the whole axis.
        let clean = lppls_value(t, &config.nonlinear, &config.linear)
            .expect("critical time validated beyond the sampled range");
        let noise = if config.noise_sigma > 0.0 {
            config.noise_sigma * rng.standard_normal()
        } else {
            0.0
        };
        times.push(t);
        prices.push(clean + noise);
    }

    ObservationSeries::from_rows(times, prices)
}
