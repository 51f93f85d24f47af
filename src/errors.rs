//! Error types and validation functions for LPPLS analysis.
//!
//! Input problems (too-short or non-monotonic series, non-finite values,
//! invalid configuration) are fatal and surface before any computation
//! starts. Numerical problems encountered while scoring an individual
//! candidate (a singular linear system, a non-converged search) are local:
//! they discard that candidate or attempt and the search continues.

use thiserror::Error;

/// Error types for LPPLS analysis operations.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum LpplsAnalysisError {
    /// Insufficient data for the requested fit.
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum required observations
        required: usize,
        /// Actual number of observations provided
        actual: usize,
    },

    /// Observation series violates a structural invariant.
    #[error("Invalid time series: {reason}")]
    InvalidTimeSeries {
        /// Description of the violated invariant
        reason: String,
    },

    /// Invalid parameter value for analysis configuration.
    #[error("Invalid parameter: {parameter} = {value}, expected {constraint}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value provided
        value: f64,
        /// Valid range or constraint description
        constraint: String,
    },

    /// The linear least-squares system is rank-deficient for the trial
    /// nonlinear parameters. Treated as "candidate rejected" by the search.
    #[error("Singular linear system: {reason}")]
    SingularSystem {
        /// Why the basis matrix degenerated
        reason: String,
    },

    /// No restart attempt produced a converged fit.
    #[error("No valid solution found after {attempts} search attempts")]
    NoValidSolution {
        /// Number of restart attempts performed
        attempts: usize,
    },

    /// Worker pool construction or shared-resource access failed.
    #[error("Concurrent execution failed: {resource}")]
    ConcurrencyError {
        /// Resource that couldn't be set up or accessed
        resource: String,
    },
}

/// Result type for LPPLS analysis operations.
pub type LpplsResult<T> = Result<T, LpplsAnalysisError>;

/// Validates that a parameter is within expected bounds.
///
/// # Example
/// ```rust
/// use lppls_finance::errors::validate_parameter;
///
/// assert!(validate_parameter(0.5, 0.0, 1.0, "m").is_ok());
/// assert!(validate_parameter(1.5, 0.0, 1.0, "m").is_err());
/// ```
pub fn validate_parameter(value: f64, min: f64, max: f64, name: &str) -> LpplsResult<()> {
    if value.is_nan() {
        return Err(LpplsAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: "must not be NaN".to_string(),
        });
    }

    if min > max || min.is_nan() || max.is_nan() {
        return Err(LpplsAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("bounds [{}, {}] are malformed", min, max),
        });
    }

    if value < min || value > max {
        Err(LpplsAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: format!("[{}, {}]", min, max),
        })
    } else {
        Ok(())
    }
}

/// Validates that a value is a strictly positive count.
pub fn validate_positive_count(value: usize, name: &str) -> LpplsResult<()> {
    if value == 0 {
        return Err(LpplsAnalysisError::InvalidParameter {
            parameter: name.to_string(),
            value: 0.0,
            constraint: "must be >= 1".to_string(),
        });
    }
    Ok(())
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first offending value; an empty slice is valid.
pub fn validate_all_finite(data: &[f64], name: &str) -> LpplsResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, &v)| !v.is_finite()) {
        return Err(LpplsAnalysisError::InvalidTimeSeries {
            reason: format!("{} contains non-finite value at index {}: {}", name, i, value),
        });
    }
    Ok(())
}

/// Validates that a time axis is strictly increasing.
pub fn validate_strictly_increasing(times: &[f64], name: &str) -> LpplsResult<()> {
    for (i, pair) in times.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(LpplsAnalysisError::InvalidTimeSeries {
                reason: format!(
                    "{} is not strictly increasing at index {}: {} -> {}",
                    name,
                    i + 1,
                    pair[0],
                    pair[1]
                ),
            });
        }
    }
    Ok(())
}
