//! Nested-fit window enumeration and parallel dispatch.
//!
//! The window family is a pure function of the grid parameters: an outer
//! loop slides the window end across the series, an inner loop shrinks the
//! window length. Each (end point, length) combination is one independent
//! fit job; jobs share only read-only access to the series and a failure in
//! one job never aborts the others.

use crate::config::{LpplsConfig, NestedFitConfig};
use crate::errors::{LpplsAnalysisError, LpplsResult};
use crate::fit::FitRunner;
use crate::observations::ObservationSeries;
use crate::results::{FitResult, NestedFitResult};
use crate::rng::FitRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// The nested-fit grid of (start, end) index pairs.
///
/// End indices are exclusive. For a grid with window size W, smallest size
/// S and inner increment I there are exactly `floor((W - S) / I) + 1`
/// window lengths per end point.
#[derive(Debug, Clone, Copy)]
pub struct WindowGrid {
    series_len: usize,
    window_size: usize,
    smallest_window_size: usize,
    outer_increment: usize,
    inner_increment: usize,
}

impl WindowGrid {
    /// Build the grid for a series of `series_len` observations.
    ///
    /// # Errors
    /// [`LpplsAnalysisError::InsufficientData`] when the series is shorter
    /// than one full window.
    pub fn new(series_len: usize, config: &NestedFitConfig) -> LpplsResult<Self> {
        config.validate()?;
        if series_len < config.window_size {
            return Err(LpplsAnalysisError::InsufficientData {
                required: config.window_size,
                actual: series_len,
            });
        }
        Ok(Self {
            series_len,
            window_size: config.window_size,
            smallest_window_size: config.smallest_window_size,
            outer_increment: config.outer_increment,
            inner_increment: config.inner_increment,
        })
    }

    /// Number of end points the outer loop visits.
    pub fn end_point_count(&self) -> usize {
        (self.series_len - self.window_size) / self.outer_increment + 1
    }

    /// Number of distinct window lengths per end point.
    pub fn lengths_per_end_point(&self) -> usize {
        (self.window_size - self.smallest_window_size) / self.inner_increment + 1
    }

    /// Total number of window jobs.
    pub fn job_count(&self) -> usize {
        self.end_point_count() * self.lengths_per_end_point()
    }

    /// Enumerate every (start, end) pair, end exclusive.
    pub fn windows(&self) -> Vec<(usize, usize)> {
        let mut jobs = Vec::with_capacity(self.job_count());
        let mut origin = 0;
        while origin + self.window_size <= self.series_len {
            let end = origin + self.window_size;
            let mut shrink = 0;
            while self.window_size - shrink >= self.smallest_window_size {
                jobs.push((origin + shrink, end));
                shrink += self.inner_increment;
            }
            origin += self.outer_increment;
        }
        jobs
    }
}

/// Shared, lock-free budget for job dispatch.
///
/// Jobs past the count cap or starting after the deadline degrade to
/// unconverged sentinels; they are still collected so per-end-date totals
/// stay accurate.
struct JobBudget {
    started: AtomicUsize,
    max_jobs: Option<usize>,
    deadline: Option<Instant>,
}

impl JobBudget {
    fn new(config: &NestedFitConfig, launched_at: Instant) -> Self {
        Self {
            started: AtomicUsize::new(0),
            max_jobs: config.max_jobs,
            deadline: config.deadline.map(|d| launched_at + d),
        }
    }

    /// Whether the next job may run. Called once at job start; in-flight
    /// jobs are never interrupted.
    fn admit(&self) -> bool {
        let index = self.started.fetch_add(1, Ordering::SeqCst);
        if let Some(cap) = self.max_jobs {
            if index >= cap {
                return false;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }
        true
    }
}

/// Compute the nested-fit ensemble over the series.
///
/// Dispatches one [`FitRunner`] job per grid window across a fixed-size
/// worker pool and collects every result, converged or not, into a
/// [`NestedFitResult`].
pub fn compute_nested_fits(
    series: &ObservationSeries,
    config: &LpplsConfig,
    nested: &NestedFitConfig,
) -> LpplsResult<NestedFitResult> {
    config.validate()?;
    let grid = WindowGrid::new(series.len(), nested)?;
    let jobs = grid.windows();

    let master_seed = config
        .seed
        .unwrap_or_else(|| FitRng::from_entropy().random_seed());
    let budget = JobBudget::new(nested, Instant::now());

    log::debug!(
        "dispatching {} window jobs across {} workers (seed {})",
        jobs.len(),
        nested.workers,
        master_seed
    );

    let run_job = |&(start, end): &(usize, usize)| -> FitResult {
        if !budget.admit() {
            return FitResult::unconverged(start, end);
        }
        let window = match series.window(start, end) {
            Ok(window) => window,
            Err(err) => {
                log::warn!("window [{}, {}) rejected: {}", start, end, err);
                return FitResult::unconverged(start, end);
            }
        };
        FitRunner::new(window, config, nested.max_searches, master_seed).run()
    };

    #[cfg(feature = "parallel")]
    let fits: Vec<FitResult> = {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(nested.workers)
            .build()
            .map_err(|e| LpplsAnalysisError::ConcurrencyError {
                resource: format!("worker pool: {}", e),
            })?;
        pool.install(|| jobs.par_iter().map(run_job).collect())
    };

    #[cfg(not(feature = "parallel"))]
    let fits: Vec<FitResult> = jobs.iter().map(run_job).collect();

    log::debug!(
        "collected {} window fits ({} converged)",
        fits.len(),
        fits.iter().filter(|f| f.converged).count()
    );

    Ok(NestedFitResult::new(fits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(series_len: usize, w: usize, s: usize, outer: usize, inner: usize) -> WindowGrid {
        let config = NestedFitConfig {
            window_size: w,
            smallest_window_size: s,
            outer_increment: outer,
            inner_increment: inner,
            ..Default::default()
        };
        WindowGrid::new(series_len, &config).unwrap()
    }

    #[test]
    fn test_lengths_per_end_point_formula() {
        // floor((W - S) / I) + 1
        assert_eq!(grid(200, 120, 30, 1, 5).lengths_per_end_point(), 19);
        assert_eq!(grid(200, 120, 30, 1, 7).lengths_per_end_point(), 13);
        assert_eq!(grid(200, 30, 30, 1, 5).lengths_per_end_point(), 1);
    }

    #[test]
    fn test_end_point_count() {
        assert_eq!(grid(200, 120, 30, 1, 5).end_point_count(), 81);
        assert_eq!(grid(200, 120, 30, 10, 5).end_point_count(), 9);
    }

    #[test]
    fn test_window_enumeration_matches_counts() {
        let g = grid(90, 40, 20, 7, 6);
        let windows = g.windows();
        assert_eq!(windows.len(), g.job_count());

        for &(start, end) in &windows {
            assert!(end <= 90);
            let length = end - start;
            assert!(length >= 20 && length <= 40);
        }

        // Each end point carries the same set of lengths.
        let first_end = windows[0].1;
        let lengths_at_first: Vec<usize> = windows
            .iter()
            .filter(|(_, e)| *e == first_end)
            .map(|(s, e)| e - s)
            .collect();
        assert_eq!(lengths_at_first.len(), g.lengths_per_end_point());
        assert_eq!(lengths_at_first[0], 40);
        assert_eq!(*lengths_at_first.last().unwrap(), 40 - 6 * 3);
    }

    #[test]
    fn test_grid_rejects_short_series() {
        let config = NestedFitConfig {
            window_size: 120,
            ..Default::default()
        };
        assert!(matches!(
            WindowGrid::new(100, &config),
            Err(LpplsAnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_job_budget_count_cap() {
        let config = NestedFitConfig {
            max_jobs: Some(2),
            ..Default::default()
        };
        let budget = JobBudget::new(&config, Instant::now());
        assert!(budget.admit());
        assert!(budget.admit());
        assert!(!budget.admit());
        assert!(!budget.admit());
    }

    #[test]
    fn test_job_budget_deadline() {
        let config = NestedFitConfig {
            deadline: Some(std::time::Duration::from_secs(0)),
            ..Default::default()
        };
        let budget = JobBudget::new(&config, Instant::now());
        assert!(!budget.admit());
    }
}
