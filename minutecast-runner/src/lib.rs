//! Minutecast Runner: fit and score linear models on feature tables.
//!
//! This crate builds on `minutecast-core` to provide:
//! - Bar loading from files or a seeded synthetic generator
//! - Train/test splitting (chronological or seeded shuffle)
//! - OLS, Ridge, Lasso and ElasticNet regressors
//! - Regression metrics (MSE, RMSE, MAE, R²)
//! - TOML pipeline configuration and run fingerprinting
//! - CSV/JSON/Markdown export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod harness;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod split;

pub use config::{ConfigError, PipelineConfig, RunId};
pub use data_loader::{generate_synthetic_bars, load, BarSource, LoadError, LoadedData, SyntheticConfig};
pub use harness::{compare_models, fit_and_evaluate, FitConfig, FitError, FitResult, ModelOutcome};
pub use metrics::RegressionMetrics;
pub use models::{LinearModel, ModelKind, ModelParams, ModelSpec, Regressor};
pub use pipeline::{
    run_comparison, run_pipeline, ComparisonEntry, ComparisonReport, PipelineError, RunReport,
    SCHEMA_VERSION,
};
pub use split::{split_rows, Split, SplitPolicy};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
        assert_send::<FitConfig>();
        assert_sync::<FitConfig>();
        assert_send::<SyntheticConfig>();
        assert_sync::<SyntheticConfig>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<FitResult>();
        assert_sync::<FitResult>();
        assert_send::<RegressionMetrics>();
        assert_sync::<RegressionMetrics>();
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
        assert_send::<ComparisonReport>();
        assert_sync::<ComparisonReport>();
    }

    #[test]
    fn model_types_are_send_sync() {
        assert_send::<LinearModel>();
        assert_sync::<LinearModel>();
        assert_send::<Box<dyn Regressor>>();
        assert_sync::<Box<dyn Regressor>>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<FitError>();
        assert_sync::<FitError>();
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
    }
}
