//! Regression metrics: pure functions over aligned target/prediction slices.
//!
//! Every metric is a pure function: observed and predicted values in, scalar
//! out. Empty inputs give 0.0.

use serde::{Deserialize, Serialize};

/// Error metrics for one partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub n_samples: usize,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        Self {
            mse: mean_squared_error(y_true, y_pred),
            rmse: root_mean_squared_error(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
            r2: r_squared(y_true, y_pred),
            n_samples: y_true.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Mean of squared residuals.
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    sum / y_true.len() as f64
}

pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean_squared_error(y_true, y_pred).sqrt()
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let sum: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();
    sum / y_true.len() as f64
}

/// Coefficient of determination: 1 - SS_res / SS_tot.
///
/// With a constant target, SS_tot is zero: a perfect prediction scores 1.0
/// and anything else 0.0.
pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    if y_true.is_empty() {
        return 0.0;
    }
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        let m = RegressionMetrics::compute(&y, &y);
        assert_eq!(m.mse, 0.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.n_samples, 3);
    }

    #[test]
    fn known_values() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];
        assert!((mean_squared_error(&y_true, &y_pred) - 0.375).abs() < EPS);
        assert!((mean_absolute_error(&y_true, &y_pred) - 0.5).abs() < EPS);
        assert!((root_mean_squared_error(&y_true, &y_pred) - 0.375_f64.sqrt()).abs() < EPS);
        assert!((r_squared(&y_true, &y_pred) - 0.948_608_137_044_967_9).abs() < 1e-12);
    }

    #[test]
    fn mean_prediction_scores_zero() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [2.0, 2.0, 2.0];
        assert!(r_squared(&y_true, &y_pred).abs() < EPS);
    }

    #[test]
    fn constant_target() {
        let y = [0.5, 0.5];
        assert_eq!(r_squared(&y, &[0.5, 0.5]), 1.0);
        assert_eq!(r_squared(&y, &[0.4, 0.6]), 0.0);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(mean_squared_error(&[], &[]), 0.0);
        assert_eq!(r_squared(&[], &[]), 0.0);
    }
}
