//! Observation series container and window views.
//!
//! The series is the §input interface of the fitting engine: a two-row
//! numeric array (strictly increasing time ordinals and natural-log prices)
//! supplied by an external data-acquisition layer that has already cleaned,
//! sorted and de-duplicated the raw data. Validation here is fail-fast:
//! nothing downstream ever has to re-check these invariants.

use crate::errors::{
    validate_all_finite, validate_strictly_increasing, LpplsAnalysisError, LpplsResult,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of free model parameters (tc, m, w, a, b, c1, c2).
pub const FREE_PARAMETERS: usize = 7;

/// Minimum observations required for a fit: twice the free parameter count.
pub const MIN_OBSERVATIONS: usize = 2 * FREE_PARAMETERS;

/// An immutable, validated observation series.
///
/// Times are strictly increasing ordinals; values are natural-log prices.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationSeries {
    times: Vec<f64>,
    log_prices: Vec<f64>,
}

impl ObservationSeries {
    /// Build a series from the two input rows, validating every invariant.
    ///
    /// # Errors
    /// - [`LpplsAnalysisError::InvalidTimeSeries`] for ragged rows,
    ///   non-finite values, or a non-monotonic time axis
    /// - [`LpplsAnalysisError::InsufficientData`] when fewer than
    ///   [`MIN_OBSERVATIONS`] points are supplied
    pub fn from_rows(times: Vec<f64>, log_prices: Vec<f64>) -> LpplsResult<Self> {
        if times.len() != log_prices.len() {
            return Err(LpplsAnalysisError::InvalidTimeSeries {
                reason: format!(
                    "time row has {} entries but price row has {}",
                    times.len(),
                    log_prices.len()
                ),
            });
        }
        if times.len() < MIN_OBSERVATIONS {
            return Err(LpplsAnalysisError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: times.len(),
            });
        }
        validate_all_finite(&times, "time row")?;
        validate_all_finite(&log_prices, "log-price row")?;
        validate_strictly_increasing(&times, "time row")?;

        Ok(Self { times, log_prices })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the series is empty (never true for a validated series).
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The time axis.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// The log-price values.
    pub fn log_prices(&self) -> &[f64] {
        &self.log_prices
    }

    /// Borrowed view of the half-open index range `[start, end)`.
    ///
    /// # Errors
    /// [`LpplsAnalysisError::InsufficientData`] when the window holds fewer
    /// than [`MIN_OBSERVATIONS`] points;
    /// [`LpplsAnalysisError::InvalidParameter`] for an out-of-range window.
    pub fn window(&self, start: usize, end: usize) -> LpplsResult<ObservationWindow<'_>> {
        if start >= end || end > self.times.len() {
            return Err(LpplsAnalysisError::InvalidParameter {
                parameter: "window".to_string(),
                value: end as f64,
                constraint: format!("[start, end) within 0..{}", self.times.len()),
            });
        }
        if end - start < MIN_OBSERVATIONS {
            return Err(LpplsAnalysisError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: end - start,
            });
        }
        Ok(ObservationWindow {
            times: &self.times[start..end],
            log_prices: &self.log_prices[start..end],
            start,
            end,
        })
    }

    /// View of the full series as a window.
    pub fn full_window(&self) -> ObservationWindow<'_> {
        ObservationWindow {
            times: &self.times,
            log_prices: &self.log_prices,
            start: 0,
            end: self.times.len(),
        }
    }
}

/// A borrowed, immutable slice of an [`ObservationSeries`].
///
/// Windows share only read-only access to the parent series, so window jobs
/// can run in parallel without any synchronization.
#[derive(Debug, Clone, Copy)]
pub struct ObservationWindow<'a> {
    times: &'a [f64],
    log_prices: &'a [f64],
    start: usize,
    end: usize,
}

impl<'a> ObservationWindow<'a> {
    /// Times within the window.
    pub fn times(&self) -> &'a [f64] {
        self.times
    }

    /// Log prices within the window.
    pub fn log_prices(&self) -> &'a [f64] {
        self.log_prices
    }

    /// Number of observations in the window.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the window is empty (never true for a validated window).
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Start index (inclusive) into the parent series.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End index (exclusive) into the parent series.
    pub fn end(&self) -> usize {
        self.end
    }

    /// First observed time in the window.
    pub fn t_first(&self) -> f64 {
        self.times[0]
    }

    /// Last observed time in the window.
    pub fn t_last(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Window length on the time axis.
    pub fn time_span(&self) -> f64 {
        self.t_last() - self.t_first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_rows(n: usize) -> (Vec<f64>, Vec<f64>) {
        let times: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let prices: Vec<f64> = (0..n).map(|i| (i as f64 * 0.01).sin()).collect();
        (times, prices)
    }

    #[test]
    fn test_from_rows_accepts_valid_series() {
        let (t, p) = valid_rows(100);
        let series = ObservationSeries::from_rows(t, p).unwrap();
        assert_eq!(series.len(), 100);
        assert_eq!(series.full_window().t_last(), 99.0);
    }

    #[test]
    fn test_from_rows_rejects_short_series() {
        let (t, p) = valid_rows(MIN_OBSERVATIONS - 1);
        match ObservationSeries::from_rows(t, p) {
            Err(LpplsAnalysisError::InsufficientData { required, actual }) => {
                assert_eq!(required, MIN_OBSERVATIONS);
                assert_eq!(actual, MIN_OBSERVATIONS - 1);
            }
            _ => panic!("Expected InsufficientData error"),
        }
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let (t, mut p) = valid_rows(50);
        p.pop();
        assert!(matches!(
            ObservationSeries::from_rows(t, p),
            Err(LpplsAnalysisError::InvalidTimeSeries { .. })
        ));
    }

    #[test]
    fn test_from_rows_rejects_non_monotonic_times() {
        let (mut t, p) = valid_rows(50);
        t[10] = t[9]; // duplicate timestamp
        assert!(ObservationSeries::from_rows(t, p).is_err());
    }

    #[test]
    fn test_from_rows_rejects_non_finite_values() {
        let (t, mut p) = valid_rows(50);
        p[3] = f64::NAN;
        assert!(ObservationSeries::from_rows(t, p).is_err());

        let (mut t, p) = valid_rows(50);
        t[0] = f64::NEG_INFINITY;
        assert!(ObservationSeries::from_rows(t, p).is_err());
    }

    #[test]
    fn test_window_bounds() {
        let (t, p) = valid_rows(100);
        let series = ObservationSeries::from_rows(t, p).unwrap();

        let w = series.window(10, 50).unwrap();
        assert_eq!(w.len(), 40);
        assert_eq!(w.start(), 10);
        assert_eq!(w.end(), 50);
        assert_eq!(w.t_first(), 10.0);
        assert_eq!(w.t_last(), 49.0);
        assert_eq!(w.time_span(), 39.0);

        assert!(series.window(50, 50).is_err());
        assert!(series.window(0, 101).is_err());
        assert!(series.window(0, MIN_OBSERVATIONS - 1).is_err());
    }
}
