//! Pipeline configuration: feature layout plus fit settings, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [features]
//! ma_windows = [5, 15, 30, 60]
//! horizon = 15
//!
//! [fit]
//! model = "ridge"
//! test_fraction = 0.2
//! split = { type = "shuffled", seed = 42 }
//! params = { alpha = 0.5 }
//! ```

use crate::harness::FitConfig;
use minutecast_core::fingerprint::DatasetHash;
use minutecast_core::FeatureConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Content-addressed identifier of a (config, dataset) pair.
pub type RunId = String;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub features: FeatureConfig,
    pub fit: FitConfig,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Feature-layout checks. Fit settings are checked when the fit runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.features.validate()?;
        Ok(())
    }

    /// Deterministic hash of this configuration.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    /// Run identifier: BLAKE3 over the config hash and the dataset hash.
    ///
    /// Identical configs on identical bars share a run id.
    pub fn run_id(&self, dataset: &DatasetHash) -> Result<RunId, ConfigError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config_hash()?.as_bytes());
        hasher.update(dataset.as_str().as_bytes());
        Ok(hasher.finalize().to_hex().to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid feature configuration: {0}")]
    Features(#[from] minutecast_core::ConfigError),

    #[error("failed to serialize config: {0}")]
    Json(#[from] serde_json::Error),
}
