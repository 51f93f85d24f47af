//! Confidence aggregation over the nested-fit ensemble.
//!
//! Fits are regrouped by window end date. For each end date the confidence
//! is the fraction of fits qualifying under the acceptance filter with the
//! corresponding regime sign; unconverged sentinels count toward the
//! denominator but can never qualify, so a window that failed to fit
//! lowers confidence instead of silently disappearing.

use crate::acceptance::{FilterConfig, RegimeDirection};
use crate::math_utils::median;
use crate::observations::ObservationSeries;
use crate::results::{ConfidencePoint, ConfidenceSeries, NestedFitResult};
use std::collections::BTreeMap;

/// Collapse the ensemble into the time-indexed confidence series.
///
/// Grouping is by window end index, so end dates appear in ascending time
/// order regardless of the order the worker pool produced the fits.
pub fn derive_confidence(
    series: &ObservationSeries,
    ensemble: &NestedFitResult,
    filter: &FilterConfig,
) -> ConfidenceSeries {
    let times = series.times();

    let mut by_end: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, fit) in ensemble.fits().iter().enumerate() {
        by_end.entry(fit.window_end).or_default().push(index);
    }

    let points = by_end
        .into_iter()
        .map(|(window_end, fit_indices)| {
            let total_fits = fit_indices.len();
            let mut qualified_up = 0usize;
            let mut qualified_down = 0usize;
            let mut damping_values = Vec::new();
            let mut oscillation_values = Vec::new();

            for &index in &fit_indices {
                let fit = &ensemble.fits()[index];
                let t_first = times[fit.window_start];
                let t_last = times[fit.window_end - 1];
                match filter.qualify(fit, t_first, t_last) {
                    Some(RegimeDirection::Bubble) => {
                        qualified_up += 1;
                        damping_values.push(fit.damping);
                        oscillation_values.push(fit.oscillations);
                    }
                    Some(RegimeDirection::AntiBubble) => {
                        qualified_down += 1;
                        damping_values.push(fit.damping);
                        oscillation_values.push(fit.oscillations);
                    }
                    None => {}
                }
            }

            ConfidencePoint {
                window_end,
                t_end: times[window_end - 1],
                confidence_up: qualified_up as f64 / total_fits as f64,
                confidence_down: qualified_down as f64 / total_fits as f64,
                median_damping: median(&damping_values),
                median_oscillations: median(&oscillation_values),
                total_fits,
                qualified_up,
                qualified_down,
            }
        })
        .collect();

    ConfidenceSeries::new(points)
}
