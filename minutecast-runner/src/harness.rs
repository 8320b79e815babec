//! Regression harness: split a feature table, fit one linear model, score it.
//!
//! The target column is never part of the design matrix. Every other column
//! of the table is a feature, in table order.

use crate::metrics::RegressionMetrics;
use crate::models::{LinearModel, ModelError, ModelKind, ModelParams, ModelSpec};
use crate::split::{split_rows, SplitPolicy};
use minutecast_core::{FeatureTable, TARGET_COLUMN};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// What to fit and how to partition the rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub target_column: String,
    /// Share of rows held out for testing, in (0, 1).
    pub test_fraction: f64,
    pub split: SplitPolicy,
    /// Model kind selector: `ols`, `lasso`, `ridge` or `elasticnet`.
    pub model: String,
    pub params: ModelParams,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_fraction: 0.2,
            split: SplitPolicy::default(),
            model: ModelKind::Ols.as_str().to_string(),
            params: ModelParams::default(),
        }
    }
}

impl FitConfig {
    /// Same settings, different model.
    pub fn with_model(&self, kind: ModelKind) -> Self {
        Self {
            model: kind.as_str().to_string(),
            ..self.clone()
        }
    }
}

/// Fitted model plus its scores on both partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: ModelParams,
    pub split: SplitPolicy,
    pub target_column: String,
    pub feature_names: Vec<String>,
    /// One per feature, aligned with `feature_names`.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train: RegressionMetrics,
    pub test: RegressionMetrics,
    /// Coordinate-descent sweeps; absent for closed-form models.
    pub iterations: Option<usize>,
    pub converged: bool,
}

impl FitResult {
    pub fn test_mse(&self) -> f64 {
        self.test.mse
    }

    pub fn test_r2(&self) -> f64 {
        self.test.r2
    }

    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|n| n == feature)
            .map(|i| self.coefficients[i])
    }

    /// Features whose coefficient is exactly zero (dropped by an L1 penalty).
    pub fn zeroed_features(&self) -> Vec<&str> {
        self.feature_names
            .iter()
            .zip(&self.coefficients)
            .filter(|(_, &c)| c == 0.0)
            .map(|(n, _)| n.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("invalid split: test_fraction {test_fraction} over {rows} rows leaves an empty partition")]
    InvalidSplit { test_fraction: f64, rows: usize },

    #[error("unknown model kind '{0}' (expected ols, lasso, ridge or elasticnet)")]
    UnknownModelKind(String),

    #[error("singular fit: {rows} training rows x {columns} features are rank deficient")]
    SingularFit { rows: usize, columns: usize },

    #[error("target column '{0}' not found in feature table")]
    MissingTargetColumn(String),

    #[error("feature table has no feature columns besides the target")]
    NoFeatures,

    #[error("invalid parameter {name} = {value}")]
    InvalidParameter { name: String, value: f64 },

    #[error("non-finite value in column '{column}' at row {row}")]
    NonFiniteValue { column: String, row: usize },
}

impl FitError {
    fn from_model(err: ModelError, rows: usize, columns: usize) -> Self {
        match err {
            ModelError::Singular => FitError::SingularFit { rows, columns },
            ModelError::InvalidParameter { name, value } => FitError::InvalidParameter {
                name: name.to_string(),
                value,
            },
        }
    }
}

/// Result of one model in a comparison run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutcome {
    pub kind: ModelKind,
    pub result: Result<FitResult, FitError>,
}

/// Split `table`, fit the configured model on the training rows and score
/// it on both partitions.
pub fn fit_and_evaluate(table: &FeatureTable, config: &FitConfig) -> Result<FitResult, FitError> {
    let kind: ModelKind = config
        .model
        .parse()
        .map_err(|_| FitError::UnknownModelKind(config.model.clone()))?;
    let spec = ModelSpec::new(kind, config.params);
    let regressor = spec
        .build()
        .map_err(|e| FitError::from_model(e, 0, 0))?;

    let target = table
        .column(&config.target_column)
        .ok_or_else(|| FitError::MissingTargetColumn(config.target_column.clone()))?;
    let features: Vec<(&str, &[f64])> = table
        .columns()
        .filter(|(name, _)| *name != config.target_column)
        .collect();
    if features.is_empty() {
        return Err(FitError::NoFeatures);
    }
    check_finite(&config.target_column, target)?;
    for (name, values) in &features {
        check_finite(name, values)?;
    }

    let split = split_rows(table.len(), config.test_fraction, config.split)?;
    let (x_train, y_train) = design(&features, target, &split.train);
    let (x_test, y_test) = design(&features, target, &split.test);
    let columns = features.len();

    let fitted = regressor
        .fit(&x_train, &y_train)
        .map_err(|e| FitError::from_model(e, split.train.len(), columns))?;
    if !fitted.is_finite() {
        return Err(FitError::SingularFit {
            rows: split.train.len(),
            columns,
        });
    }

    let train = score(&fitted, &x_train, &y_train);
    let test = score(&fitted, &x_test, &y_test);

    info!(
        model = %kind,
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        features = columns,
        test_mse = test.mse,
        test_r2 = test.r2,
        "model fitted"
    );

    Ok(FitResult {
        model: kind,
        params: config.params,
        split: config.split,
        target_column: config.target_column.clone(),
        feature_names: features.iter().map(|(n, _)| n.to_string()).collect(),
        coefficients: fitted.coefficients.to_vec(),
        intercept: fitted.intercept,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        train,
        test,
        iterations: fitted.iterations,
        converged: fitted.converged,
    })
}

/// Fit each kind over the same table and split settings.
pub fn compare_models(
    table: &FeatureTable,
    config: &FitConfig,
    kinds: &[ModelKind],
) -> Vec<ModelOutcome> {
    kinds
        .iter()
        .map(|&kind| ModelOutcome {
            kind,
            result: fit_and_evaluate(table, &config.with_model(kind)),
        })
        .collect()
}

fn check_finite(column: &str, values: &[f64]) -> Result<(), FitError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(row) => Err(FitError::NonFiniteValue {
            column: column.to_string(),
            row,
        }),
        None => Ok(()),
    }
}

fn design(features: &[(&str, &[f64])], target: &[f64], rows: &[usize]) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((rows.len(), features.len()), |(r, j)| features[j].1[rows[r]]);
    let y = rows.iter().map(|&r| target[r]).collect::<Array1<f64>>();
    (x, y)
}

fn score(model: &LinearModel, x: &Array2<f64>, y: &Array1<f64>) -> RegressionMetrics {
    let predicted = model.predict(x);
    RegressionMetrics::compute(&y.to_vec(), &predicted.to_vec())
}
