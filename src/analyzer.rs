//! Top-level orchestration of LPPLS fitting and the confidence ensemble.
//!
//! [`LpplsAnalyzer`] owns one validated observation series and an immutable
//! configuration, and exposes the three analytic operations: a single
//! full-series fit, the windowed nested-fit ensemble, and the derived
//! confidence series. All heavy lifting lives in the lower modules; this
//! type only wires windows, seeds and configuration together.

use crate::config::{LpplsConfig, NestedFitConfig, DEFAULT_MAX_SEARCHES};
use crate::errors::{LpplsAnalysisError, LpplsResult};
use crate::fit::FitRunner;
use crate::observations::ObservationSeries;
use crate::results::{ConfidenceSeries, FitResult, NestedFitResult};
use crate::rng::FitRng;
use crate::windows;
use crate::confidence;

/// Orchestrates LPPLS analysis over one observation series.
#[derive(Debug, Clone)]
pub struct LpplsAnalyzer {
    observations: ObservationSeries,
    config: LpplsConfig,
}

impl LpplsAnalyzer {
    /// Create an analyzer with the default configuration.
    pub fn new(observations: ObservationSeries) -> Self {
        Self {
            observations,
            config: LpplsConfig::default(),
        }
    }

    /// Create an analyzer with an explicit configuration.
    ///
    /// # Errors
    /// [`LpplsAnalysisError::InvalidParameter`] when the configuration is
    /// inconsistent.
    pub fn with_config(observations: ObservationSeries, config: LpplsConfig) -> LpplsResult<Self> {
        config.validate()?;
        Ok(Self {
            observations,
            config,
        })
    }

    /// The observation series under analysis.
    pub fn observations(&self) -> &ObservationSeries {
        &self.observations
    }

    /// The active configuration.
    pub fn config(&self) -> &LpplsConfig {
        &self.config
    }

    /// Fit the full series with `max_searches` restart attempts
    /// (conventionally 25).
    ///
    /// # Errors
    /// [`LpplsAnalysisError::NoValidSolution`] when no restart converges,
    /// so callers never consume fabricated parameter values.
    pub fn fit(&self, max_searches: usize) -> LpplsResult<FitResult> {
        let window = self.observations.full_window();
        self.fit_window_impl(window.start(), window.end(), max_searches)
    }

    /// Fit the full series with the default restart count.
    pub fn fit_default(&self) -> LpplsResult<FitResult> {
        self.fit(DEFAULT_MAX_SEARCHES)
    }

    /// Fit one sub-window `[start, end)` of the series.
    ///
    /// # Errors
    /// Input errors for an invalid window, or
    /// [`LpplsAnalysisError::NoValidSolution`] when no restart converges.
    pub fn fit_window(
        &self,
        start: usize,
        end: usize,
        max_searches: usize,
    ) -> LpplsResult<FitResult> {
        self.fit_window_impl(start, end, max_searches)
    }

    fn fit_window_impl(
        &self,
        start: usize,
        end: usize,
        max_searches: usize,
    ) -> LpplsResult<FitResult> {
        if max_searches == 0 {
            return Err(LpplsAnalysisError::InvalidParameter {
                parameter: "max_searches".to_string(),
                value: 0.0,
                constraint: "must be >= 1".to_string(),
            });
        }
        let window = self.observations.window(start, end)?;
        let master_seed = self.resolve_seed();
        let fit = FitRunner::new(window, &self.config, max_searches, master_seed).run();
        if !fit.converged {
            return Err(LpplsAnalysisError::NoValidSolution {
                attempts: max_searches,
            });
        }
        Ok(fit)
    }

    /// Compute the nested-fit ensemble across the configured window grid.
    pub fn compute_nested_fits(&self, nested: &NestedFitConfig) -> LpplsResult<NestedFitResult> {
        windows::compute_nested_fits(&self.observations, &self.config, nested)
    }

    /// Collapse a nested-fit ensemble into the confidence series using the
    /// configured acceptance filter.
    pub fn derive_confidence(&self, ensemble: &NestedFitResult) -> ConfidenceSeries {
        confidence::derive_confidence(&self.observations, ensemble, &self.config.filter)
    }

    fn resolve_seed(&self) -> u64 {
        self.config
            .seed
            .unwrap_or_else(|| FitRng::from_entropy().random_seed())
    }
}
