//! End-to-end pipeline: bars → feature table → fitted model → report.

use crate::config::{ConfigError, PipelineConfig, RunId};
use crate::data_loader::{LoadError, LoadedData};
use crate::harness::{compare_models, fit_and_evaluate, FitError, FitResult};
use crate::models::ModelKind;
use minutecast_core::fingerprint::DatasetHash;
use minutecast_core::{Bar, BarError, FeatureBuilder, FeatureConfig, FeatureTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Version of the persisted report layout. Bumped on breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Bar(#[from] BarError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("fit error: {0}")]
    Fit(#[from] FitError),
}

impl From<minutecast_core::ConfigError> for PipelineError {
    fn from(e: minutecast_core::ConfigError) -> Self {
        PipelineError::Config(ConfigError::Features(e))
    }
}

/// One fitted run with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: DatasetHash,
    pub synthetic: bool,
    /// Input bars.
    pub bars: usize,
    /// Feature-table rows after warmup and horizon trimming.
    pub rows: usize,
    pub config: PipelineConfig,
    pub result: FitResult,
}

/// Per-model entry of a comparison run. Exactly one of `result`/`error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub model: ModelKind,
    pub result: Option<FitResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub schema_version: u32,
    pub run_id: RunId,
    pub dataset_hash: DatasetHash,
    pub synthetic: bool,
    pub bars: usize,
    pub rows: usize,
    pub config: PipelineConfig,
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonReport {
    /// Fitted entry with the lowest test MSE.
    pub fn best(&self) -> Option<&FitResult> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref())
            .min_by(|a, b| a.test.mse.total_cmp(&b.test.mse))
    }
}

/// Validate the layout and build the labeled feature table.
pub fn build_features(bars: &[Bar], config: &FeatureConfig) -> Result<FeatureTable, PipelineError> {
    let builder = FeatureBuilder::new(config.clone())?;
    Ok(builder.build(bars)?)
}

/// Build features from `data` and fit the configured model.
pub fn run_pipeline(data: &LoadedData, config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let run_id = config.run_id(&data.dataset_hash)?;
    let table = build_features(&data.bars, &config.features)?;
    let result = fit_and_evaluate(&table, &config.fit)?;

    info!(
        run_id = %short(&run_id),
        bars = data.bars.len(),
        rows = table.len(),
        model = %result.model,
        test_r2 = result.test.r2,
        synthetic = data.synthetic,
        "pipeline complete"
    );

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash: data.dataset_hash.clone(),
        synthetic: data.synthetic,
        bars: data.bars.len(),
        rows: table.len(),
        config: config.clone(),
        result,
    })
}

/// Build features once and fit every kind in `kinds` over the same split.
///
/// Individual model failures are recorded per entry; only feature-building
/// and configuration problems fail the whole comparison.
pub fn run_comparison(
    data: &LoadedData,
    config: &PipelineConfig,
    kinds: &[ModelKind],
) -> Result<ComparisonReport, PipelineError> {
    config.validate()?;
    let run_id = config.run_id(&data.dataset_hash)?;
    let table = build_features(&data.bars, &config.features)?;

    let entries: Vec<ComparisonEntry> = compare_models(&table, &config.fit, kinds)
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(result) => ComparisonEntry {
                model: outcome.kind,
                result: Some(result),
                error: None,
            },
            Err(e) => ComparisonEntry {
                model: outcome.kind,
                result: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    info!(
        run_id = %short(&run_id),
        rows = table.len(),
        models = entries.len(),
        failed = entries.iter().filter(|e| e.error.is_some()).count(),
        "comparison complete"
    );

    Ok(ComparisonReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash: data.dataset_hash.clone(),
        synthetic: data.synthetic,
        bars: data.bars.len(),
        rows: table.len(),
        config: config.clone(),
        entries,
    })
}

fn short(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
