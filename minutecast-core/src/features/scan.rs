//! Explicit windowed scans over ordered `f64` series.
//!
//! These replace the dataframe-library primitives (`pct_change`, `rolling`,
//! `shift`) with position-based loops whose undefined-value handling is
//! spelled out:
//! - positions without enough history are NaN,
//! - a NaN input anywhere in the window yields NaN,
//! - division by zero yields NaN.

/// `numerator / denominator`, NaN when either side is NaN or the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if numerator.is_nan() || denominator.is_nan() || denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// One-step percent change: `(x[i] - x[i-1]) / x[i-1]`, NaN at position 0.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        let prev = values[i - 1];
        result[i] = safe_ratio(values[i] - prev, prev);
    }
    result
}

/// Return over `lag` positions: `x[i] / x[i-lag] - 1`, NaN for `i < lag`.
pub fn lag_return(values: &[f64], lag: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for i in lag..values.len() {
        result[i] = safe_ratio(values[i], values[i - lag]) - 1.0;
    }
    result
}

/// Trailing simple mean over `window` positions.
///
/// NaN for `i < window - 1` and for any window that contains a NaN.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "rolling window must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    // Running sum over the finite members of the window; NaNs are counted
    // separately so a single NaN does not poison the sum forever.
    let mut sum = 0.0;
    let mut nan_count = 0usize;

    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_count += 1;
        } else {
            sum += entering;
        }

        if i >= window {
            let leaving = values[i - window];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= window && nan_count == 0 {
            result[i] = sum / window as f64;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn pct_change_basic() {
        let result = pct_change(&[100.0, 110.0, 99.0]);
        assert!(result[0].is_nan());
        assert_approx(result[1], 0.1, DEFAULT_EPSILON);
        assert_approx(result[2], -0.1, DEFAULT_EPSILON);
    }

    #[test]
    fn pct_change_zero_previous_is_nan() {
        let result = pct_change(&[0.0, 5.0, 10.0]);
        assert!(result[1].is_nan());
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn pct_change_empty_and_single() {
        assert!(pct_change(&[]).is_empty());
        let single = pct_change(&[3.0]);
        assert_eq!(single.len(), 1);
        assert!(single[0].is_nan());
    }

    #[test]
    fn lag_return_basic() {
        let result = lag_return(&[100.0, 110.0, 121.0], 2);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 0.21, 1e-12);
    }

    #[test]
    fn lag_return_longer_than_series() {
        let result = lag_return(&[1.0, 2.0], 5);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_mean_basic() {
        let result = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5);
        for v in &result[..4] {
            assert!(v.is_nan());
        }
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_window_one_is_identity() {
        let result = rolling_mean(&[1.0, 2.0, 3.0], 1);
        assert_eq!(result, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn rolling_mean_nan_propagation() {
        let result = rolling_mean(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_of_pct_change_starts_at_window() {
        let returns = pct_change(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = rolling_mean(&returns, 3);
        // Position 0 of the percent change is NaN, so the first full window
        // without NaN ends at position 3.
        assert!(result[2].is_nan());
        let expected = (returns[1] + returns[2] + returns[3]) / 3.0;
        assert_approx(result[3], expected, DEFAULT_EPSILON);
    }

    #[test]
    fn safe_ratio_guards_zero_and_nan() {
        assert!(safe_ratio(1.0, 0.0).is_nan());
        assert!(safe_ratio(f64::NAN, 1.0).is_nan());
        assert_approx(safe_ratio(3.0, 4.0), 0.75, DEFAULT_EPSILON);
    }
}
