//! Serializable feature-builder configuration.

use crate::features::Session;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What `VolCount` becomes on a bar with zero trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroCountPolicy {
    /// Undefined; the row is dropped from the table.
    #[default]
    Nan,
    /// Zero volume per trade.
    Zero,
}

/// How the `open_returns` column is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenReturnsPolicy {
    /// `open_returns` from open prices, plus a separate `low_returns`.
    #[default]
    Corrected,
    /// `open_returns` carries the low-price percent change and no
    /// `low_returns` column is emitted. Matches legacy feature files.
    LowAlias,
}

/// Session indicator columns, in output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionConfig {
    pub sessions: Vec<Session>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sessions: vec![Session::london(), Session::asia()],
        }
    }
}

/// Everything that shapes the feature table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Windows of the rolling close-return means (`MA{w}`).
    pub ma_windows: Vec<usize>,

    /// Lags of the multi-bar close returns (`returns_{lag}`).
    pub return_lags: Vec<usize>,

    /// Forward horizon of the `target` label, in bars.
    pub horizon: usize,

    pub zero_count: ZeroCountPolicy,
    pub open_returns: OpenReturnsPolicy,
    pub sessions: SessionConfig,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ma_windows: vec![5, 15, 30, 60],
            return_lags: vec![5, 15, 30, 60],
            horizon: 15,
            zero_count: ZeroCountPolicy::default(),
            open_returns: OpenReturnsPolicy::default(),
            sessions: SessionConfig::default(),
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(&w) = self.ma_windows.iter().find(|&&w| w == 0) {
            return Err(ConfigError::InvalidWindow(w));
        }
        if let Some(&lag) = self.return_lags.iter().find(|&&l| l == 0) {
            return Err(ConfigError::InvalidLag(lag));
        }
        if self.horizon == 0 {
            return Err(ConfigError::InvalidHorizon(0));
        }
        for session in &self.sessions.sessions {
            if session.name.is_empty() {
                return Err(ConfigError::UnnamedSession);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rolling window must be >= 1, got {0}")]
    InvalidWindow(usize),

    #[error("return lag must be >= 1, got {0}")]
    InvalidLag(usize),

    #[error("label horizon must be >= 1, got {0}")]
    InvalidHorizon(usize),

    #[error("session name must not be empty")]
    UnnamedSession,

    #[error("feature column '{0}' would appear more than once")]
    DuplicateColumn(String),
}
