//! Analysis configuration.
//!
//! Every component receives its configuration as an explicit immutable
//! value; nothing reads ambient or global state, so concurrent window jobs
//! can never race on configuration mutation.

use crate::acceptance::FilterConfig;
use crate::errors::{validate_positive_count, LpplsAnalysisError, LpplsResult};
use crate::observations::MIN_OBSERVATIONS;
use crate::optimizer::NelderMeadOptions;
use crate::search::SearchBounds;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Top-level configuration for single fits and the windowed ensemble.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LpplsConfig {
    /// Search bounds for the nonlinear parameters.
    pub search_bounds: SearchBounds,
    /// Termination controls for each local search.
    pub optimizer: NelderMeadOptions,
    /// Qualification thresholds for the confidence indicator.
    pub filter: FilterConfig,
    /// Master seed for reproducible fitting; `None` draws one from OS
    /// entropy.
    pub seed: Option<u64>,
}

impl LpplsConfig {
    /// Validate all nested configuration.
    pub fn validate(&self) -> LpplsResult<()> {
        self.search_bounds.validate()?;
        self.optimizer.validate()?;
        self.filter.validate()?;
        Ok(())
    }
}

/// Default restart count for a fit.
pub const DEFAULT_MAX_SEARCHES: usize = 25;

/// Configuration for the nested-fit window ensemble.
///
/// The outer loop slides the window end across the series in steps of
/// `outer_increment`; the inner loop shrinks the window length from
/// `window_size` down to `smallest_window_size` in steps of
/// `inner_increment`. Defaults follow common daily-data usage: a 120-point
/// window shrinking to 30 points.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestedFitConfig {
    /// Fixed worker-pool size for parallel window jobs.
    pub workers: usize,
    /// Largest (and initial) window length, in observations.
    pub window_size: usize,
    /// Smallest window length the inner loop shrinks to.
    pub smallest_window_size: usize,
    /// Step of the sliding window end, in observations.
    pub outer_increment: usize,
    /// Step of the shrinking window length, in observations.
    pub inner_increment: usize,
    /// Restart count per window job.
    pub max_searches: usize,
    /// Optional cap on the number of window jobs actually fitted; jobs past
    /// the cap still appear in the ensemble as unconverged sentinels.
    pub max_jobs: Option<usize>,
    /// Optional wall-clock budget; jobs starting after the deadline degrade
    /// to unconverged sentinels while in-flight jobs complete normally.
    pub deadline: Option<Duration>,
}

impl Default for NestedFitConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            window_size: 120,
            smallest_window_size: 30,
            outer_increment: 1,
            inner_increment: 5,
            max_searches: DEFAULT_MAX_SEARCHES,
            max_jobs: None,
            deadline: None,
        }
    }
}

impl NestedFitConfig {
    /// Validate the grid and pool parameters.
    pub fn validate(&self) -> LpplsResult<()> {
        validate_positive_count(self.workers, "workers")?;
        validate_positive_count(self.outer_increment, "outer_increment")?;
        validate_positive_count(self.inner_increment, "inner_increment")?;
        validate_positive_count(self.max_searches, "max_searches")?;
        if self.smallest_window_size < MIN_OBSERVATIONS {
            return Err(LpplsAnalysisError::InvalidParameter {
                parameter: "smallest_window_size".to_string(),
                value: self.smallest_window_size as f64,
                constraint: format!(">= {}", MIN_OBSERVATIONS),
            });
        }
        if self.window_size < self.smallest_window_size {
            return Err(LpplsAnalysisError::InvalidParameter {
                parameter: "window_size".to_string(),
                value: self.window_size as f64,
                constraint: format!(">= smallest_window_size ({})", self.smallest_window_size),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_validate() {
        assert!(LpplsConfig::default().validate().is_ok());
        assert!(NestedFitConfig::default().validate().is_ok());
    }

    #[test]
    fn test_nested_config_rejects_bad_grid() {
        let bad = NestedFitConfig {
            window_size: 20,
            smallest_window_size: 30,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = NestedFitConfig {
            smallest_window_size: MIN_OBSERVATIONS - 1,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = NestedFitConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = NestedFitConfig {
            inner_increment: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
