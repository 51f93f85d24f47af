//! Small numerical helpers shared across the fitting engine.

/// Floating-point comparison helpers.
pub mod float_ops {
    /// Approximate equality with an explicit absolute epsilon.
    #[inline]
    pub fn approx_eq_eps(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    /// Approximate-zero check with an explicit absolute epsilon.
    #[inline]
    pub fn approx_zero_eps(value: f64, eps: f64) -> bool {
        value.abs() <= eps
    }
}

/// Median of a set of values, ignoring non-finite entries.
///
/// Returns `None` when no finite values remain. Uses the midpoint of the two
/// central order statistics for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).expect("finite values are totally ordered"));
    let n = finite.len();
    if n % 2 == 1 {
        Some(finite[n / 2])
    } else {
        Some(0.5 * (finite[n / 2 - 1] + finite[n / 2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_helpers() {
        assert!(float_ops::approx_eq_eps(1.0, 1.0 + 1e-12, 1e-10));
        assert!(!float_ops::approx_eq_eps(1.0, 1.1, 1e-10));
        assert!(float_ops::approx_zero_eps(-1e-14, 1e-12));
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_median_filters_non_finite() {
        assert_eq!(median(&[f64::NAN, 1.0, f64::INFINITY, 3.0]), Some(2.0));
        assert_eq!(median(&[f64::NAN]), None);
        assert_eq!(median(&[]), None);
    }
}
