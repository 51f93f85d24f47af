//! Acceptance filtering of fit results.
//!
//! A stateless predicate set deciding whether a [`FitResult`] qualifies as a
//! credible bubble or anti-bubble signal. All thresholds are configurable
//! policy, not constants: the conventional LPPLS literature disagrees on the
//! exact cutoffs, so callers can tighten or relax every check.
//!
//! Sign convention: `b < 0` is the bubble (upward, super-exponential)
//! regime, `b > 0` the anti-bubble (downward) regime. A vanishing `b` has no
//! direction and never qualifies.

use crate::errors::{validate_parameter, LpplsResult};
use crate::results::FitResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Regime direction encoded by the sign of the power-law amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegimeDirection {
    /// Upward speculative bubble (`b < 0`).
    Bubble,
    /// Downward anti-bubble (`b > 0`).
    AntiBubble,
}

/// Configurable qualification thresholds for a fit.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterConfig {
    /// Admissible interior interval for the exponent.
    pub m_range: (f64, f64),
    /// Admissible band for the angular log-frequency.
    pub w_range: (f64, f64),
    /// tc must lie within `[t_last, t_last + tc_extension * window_length]`.
    pub tc_extension: f64,
    /// Maximum damping indicator; small D means strongly damped, credible
    /// oscillations.
    pub max_damping: f64,
    /// Minimum number of oscillations the fit must complete over its window.
    pub min_oscillations: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            m_range: (0.01, 0.99),
            w_range: (4.0, 25.0),
            tc_extension: 0.5,
            max_damping: 1.0,
            min_oscillations: 2.5,
        }
    }
}

impl FilterConfig {
    /// Validate the threshold ranges.
    pub fn validate(&self) -> LpplsResult<()> {
        validate_parameter(self.m_range.0, 0.0, self.m_range.1, "filter m lower bound")?;
        validate_parameter(self.m_range.1, self.m_range.0, 1.0, "filter m upper bound")?;
        validate_parameter(self.w_range.0, 0.0, self.w_range.1, "filter w lower bound")?;
        validate_parameter(
            self.w_range.1,
            self.w_range.0,
            f64::INFINITY,
            "filter w upper bound",
        )?;
        validate_parameter(self.tc_extension, 0.0, 10.0, "tc_extension")?;
        validate_parameter(self.max_damping, 0.0, f64::INFINITY, "max_damping")?;
        validate_parameter(
            self.min_oscillations,
            0.0,
            f64::INFINITY,
            "min_oscillations",
        )?;
        Ok(())
    }

    /// Apply every check to a fit over the window spanning
    /// `[t_first, t_last]`.
    ///
    /// Returns the regime direction for a qualified fit, `None` otherwise.
    /// Unconverged sentinels never qualify.
    pub fn qualify(&self, fit: &FitResult, t_first: f64, t_last: f64) -> Option<RegimeDirection> {
        if !fit.converged {
            return None;
        }

        let window_length = t_last - t_first;
        let tc_max = t_last + self.tc_extension * window_length;
        if !(fit.tc >= t_last && fit.tc <= tc_max) {
            return None;
        }
        if !(fit.m >= self.m_range.0 && fit.m <= self.m_range.1) {
            return None;
        }
        if !(fit.w >= self.w_range.0 && fit.w <= self.w_range.1) {
            return None;
        }
        if !(fit.damping.is_finite() && fit.damping <= self.max_damping) {
            return None;
        }
        if !(fit.oscillations.is_finite() && fit.oscillations >= self.min_oscillations) {
            return None;
        }

        if fit.b < 0.0 {
            Some(RegimeDirection::Bubble)
        } else if fit.b > 0.0 {
            Some(RegimeDirection::AntiBubble)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualified_fit() -> FitResult {
        FitResult {
            tc: 520.0,
            m: 0.5,
            w: 8.0,
            a: 7.0,
            b: -1.0,
            c1: -0.3,
            c2: 0.0,
            rss: 0.05,
            damping: 0.2,
            oscillations: 4.0,
            window_start: 0,
            window_end: 500,
            converged: true,
        }
    }

    #[test]
    fn test_qualified_bubble() {
        let filter = FilterConfig::default();
        assert_eq!(
            filter.qualify(&qualified_fit(), 0.0, 499.0),
            Some(RegimeDirection::Bubble)
        );
    }

    #[test]
    fn test_positive_b_is_anti_bubble() {
        let filter = FilterConfig::default();
        let mut fit = qualified_fit();
        fit.b = 1.0;
        assert_eq!(
            filter.qualify(&fit, 0.0, 499.0),
            Some(RegimeDirection::AntiBubble)
        );
    }

    #[test]
    fn test_unconverged_never_qualifies() {
        let filter = FilterConfig::default();
        let mut fit = qualified_fit();
        fit.converged = false;
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);
    }

    #[test]
    fn test_tc_outside_extension_fails() {
        let filter = FilterConfig::default();
        let mut fit = qualified_fit();
        // window length 499, extension 0.5 -> tc_max = 499 + 249.5
        fit.tc = 800.0;
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);
        fit.tc = 400.0; // before the window end
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);
    }

    #[test]
    fn test_each_threshold_rejects() {
        let filter = FilterConfig::default();

        let mut fit = qualified_fit();
        fit.m = 0.999;
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);

        let mut fit = qualified_fit();
        fit.w = 30.0;
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);

        let mut fit = qualified_fit();
        fit.damping = 5.0;
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);

        let mut fit = qualified_fit();
        fit.oscillations = 1.0;
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);

        let mut fit = qualified_fit();
        fit.b = 0.0;
        assert_eq!(filter.qualify(&fit, 0.0, 499.0), None);
    }

    #[test]
    fn test_validation() {
        assert!(FilterConfig::default().validate().is_ok());
        let bad = FilterConfig {
            m_range: (0.9, 0.1),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
