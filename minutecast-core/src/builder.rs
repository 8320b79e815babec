//! Feature table assembly.
//!
//! Every feature column is computed once over the full bar series, the
//! forward label is attached, and any row with an undefined value is
//! dropped. With the default configuration that removes the first 60 rows
//! (longest lookback) and the last 15 rows (label horizon).

use crate::config::{ConfigError, FeatureConfig, OpenReturnsPolicy};
use crate::domain::{count_gaps, validate_series, Bar, BarError};
use crate::features::{
    BarField, Feature, LagReturn, MeanReturn, PctChange, Raw, SessionFlag, Spread,
    VolumePerTrade, Weekend,
};
use crate::label::ForwardReturn;
use crate::table::{FeatureTable, TARGET_COLUMN};
use chrono::Duration;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Builds labeled feature tables from minute bars.
pub struct FeatureBuilder {
    features: Vec<Box<dyn Feature>>,
    label: ForwardReturn,
}

impl FeatureBuilder {
    pub fn new(config: FeatureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let features = feature_set(&config);

        let mut seen = HashSet::new();
        for feature in &features {
            if !seen.insert(feature.name()) || feature.name() == TARGET_COLUMN {
                return Err(ConfigError::DuplicateColumn(feature.name().to_string()));
            }
        }

        let label = ForwardReturn::new(config.horizon);
        Ok(Self {
            features,
            label,
        })
    }

    /// Output column names in order, `target` last.
    pub fn columns(&self) -> Vec<String> {
        self.features
            .iter()
            .map(|f| f.name().to_string())
            .chain(std::iter::once(self.label.name().to_string()))
            .collect()
    }

    /// Longest feature lookback: leading rows that can never be complete.
    pub fn warmup(&self) -> usize {
        self.features.iter().map(|f| f.lookback()).max().unwrap_or(0)
    }

    pub fn horizon(&self) -> usize {
        self.label.horizon()
    }

    /// Compute the labeled feature table for an ordered bar series.
    ///
    /// Malformed input (out-of-order or duplicate timestamps, non-finite
    /// fields) is rejected. Rows with any undefined value are dropped, so
    /// inputs of `warmup() + horizon()` bars or fewer give an empty table.
    pub fn build(&self, bars: &[Bar]) -> Result<FeatureTable, BarError> {
        validate_series(bars)?;

        let names = self.columns();
        if bars.is_empty() {
            return Ok(FeatureTable::empty(names));
        }

        let gaps = count_gaps(bars, Duration::minutes(1));
        if gaps > 0 {
            warn!(gaps, bars = bars.len(), "bar series has gaps in the minute grid");
        }

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(names.len());
        for feature in &self.features {
            let series = feature.compute(bars);
            debug_assert_eq!(
                series.len(),
                bars.len(),
                "feature '{}' produced {} values for {} bars",
                feature.name(),
                series.len(),
                bars.len()
            );
            columns.push(series);
        }
        columns.push(self.label.compute(bars));

        let timestamps = bars.iter().map(|b| b.timestamp).collect();
        let table = FeatureTable::assemble(timestamps, names, columns).drop_incomplete_rows();
        let rows = table.len();

        debug!(
            bars = bars.len(),
            rows,
            dropped = bars.len() - rows,
            columns = table.width(),
            warmup = self.warmup(),
            horizon = self.horizon(),
            "feature table built"
        );

        Ok(table)
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        let config = FeatureConfig::default();
        Self {
            features: feature_set(&config),
            label: ForwardReturn::new(config.horizon),
        }
    }
}

/// Feature columns in output order.
fn feature_set(config: &FeatureConfig) -> Vec<Box<dyn Feature>> {
    let mut features: Vec<Box<dyn Feature>> = vec![
        Box::new(Raw::new(BarField::Vwap)),
        Box::new(Raw::new(BarField::Volume)),
        Box::new(Raw::new(BarField::UsdVolume)),
        Box::new(Raw::new(BarField::Count)),
        Box::new(Spread::close_minus_open()),
        Box::new(Spread::high_minus_low()),
    ];

    match config.open_returns {
        OpenReturnsPolicy::Corrected => {
            features.push(Box::new(PctChange::new(BarField::Open)));
            features.push(Box::new(PctChange::new(BarField::High)));
            features.push(Box::new(PctChange::new(BarField::Low)));
        }
        OpenReturnsPolicy::LowAlias => {
            features.push(Box::new(PctChange::named(BarField::Low, "open_returns")));
            features.push(Box::new(PctChange::new(BarField::High)));
        }
    }
    features.push(Box::new(PctChange::new(BarField::Close)));
    features.push(Box::new(PctChange::new(BarField::Vwap)));

    for &window in &config.ma_windows {
        features.push(Box::new(MeanReturn::new(window)));
    }
    for &lag in &config.return_lags {
        features.push(Box::new(LagReturn::new(lag)));
    }

    features.push(Box::new(VolumePerTrade::new(config.zero_count)));
    features.push(Box::new(Weekend));
    for session in &config.sessions.sessions {
        features.push(Box::new(SessionFlag::new(session.clone())));
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZeroCountPolicy;
    use crate::features::{assert_approx, make_bars};

    fn linear_closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn default_column_layout() {
        let builder = FeatureBuilder::default();
        assert_eq!(
            builder.columns(),
            vec![
                "vwap", "volume", "usd_volume", "count", "c_minus_o", "h_minus_l",
                "open_returns", "high_returns", "low_returns", "close_returns",
                "vwap_returns", "MA5", "MA15", "MA30", "MA60", "returns_5",
                "returns_15", "returns_30", "returns_60", "VolCount", "weekend",
                "London", "Asia", "target",
            ]
        );
        assert_eq!(builder.warmup(), 60);
        assert_eq!(builder.horizon(), 15);
    }

    #[test]
    fn low_alias_layout() {
        let config = FeatureConfig {
            open_returns: OpenReturnsPolicy::LowAlias,
            ..FeatureConfig::default()
        };
        let builder = FeatureBuilder::new(config).unwrap();
        let columns = builder.columns();
        assert!(columns.contains(&"open_returns".to_string()));
        assert!(!columns.contains(&"low_returns".to_string()));

        let bars = make_bars(&linear_closes(100));
        let table = builder.build(&bars).unwrap();
        let default_table = FeatureBuilder::default().build(&bars).unwrap();
        assert_eq!(
            table.column("open_returns"),
            default_table.column("low_returns")
        );
    }

    #[test]
    fn drops_warmup_and_horizon_rows() {
        let bars = make_bars(&linear_closes(100));
        let table = FeatureBuilder::default().build(&bars).unwrap();

        assert_eq!(table.len(), 100 - 60 - 15);
        assert_eq!(table.timestamps()[0], bars[60].timestamp);
        assert_eq!(table.timestamps()[24], bars[84].timestamp);
    }

    #[test]
    fn every_value_is_finite() {
        let bars = make_bars(&linear_closes(120));
        let table = FeatureBuilder::default().build(&bars).unwrap();
        for (name, column) in table.columns() {
            assert!(column.iter().all(|v| v.is_finite()), "{name} has undefined values");
        }
    }

    #[test]
    fn short_and_empty_inputs_give_empty_tables() {
        let builder = FeatureBuilder::default();
        let empty = builder.build(&[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.width(), 24);

        let short = builder.build(&make_bars(&linear_closes(75))).unwrap();
        assert!(short.is_empty());

        let just_enough = builder.build(&make_bars(&linear_closes(76))).unwrap();
        assert_eq!(just_enough.len(), 1);
    }

    #[test]
    fn zero_count_row_is_dropped_by_default() {
        let mut bars = make_bars(&linear_closes(100));
        bars[70].count = 0;

        let table = FeatureBuilder::default().build(&bars).unwrap();
        assert_eq!(table.len(), 24);
        assert!(!table.timestamps().contains(&bars[70].timestamp));

        let config = FeatureConfig {
            zero_count: ZeroCountPolicy::Zero,
            ..FeatureConfig::default()
        };
        let table = FeatureBuilder::new(config).unwrap().build(&bars).unwrap();
        assert_eq!(table.len(), 25);
        let row = table.row(10).unwrap();
        assert_eq!(row.timestamp(), bars[70].timestamp);
        assert_eq!(row.get("VolCount"), Some(0.0));
    }

    #[test]
    fn target_is_forward_close_return() {
        let closes = linear_closes(100);
        let bars = make_bars(&closes);
        let table = FeatureBuilder::default().build(&bars).unwrap();

        for row in table.rows() {
            let i = 60 + row.index();
            let expected = closes[i + 15] / closes[i] - 1.0;
            assert_approx(row.get("target").unwrap(), expected, 1e-12);
        }
    }

    #[test]
    fn rejects_malformed_series() {
        let mut bars = make_bars(&linear_closes(10));
        bars[5].timestamp = bars[4].timestamp;
        let err = FeatureBuilder::default().build(&bars).unwrap_err();
        assert!(matches!(err, BarError::DuplicateTimestamp { index: 5, .. }));
    }

    #[test]
    fn duplicate_windows_are_rejected() {
        let config = FeatureConfig {
            ma_windows: vec![5, 5],
            ..FeatureConfig::default()
        };
        assert!(matches!(
            FeatureBuilder::new(config),
            Err(ConfigError::DuplicateColumn(name)) if name == "MA5"
        ));
    }

    #[test]
    fn custom_windows_change_warmup() {
        let config = FeatureConfig {
            ma_windows: vec![3],
            return_lags: vec![2],
            horizon: 4,
            ..FeatureConfig::default()
        };
        let builder = FeatureBuilder::new(config).unwrap();
        assert_eq!(builder.warmup(), 3);
        let table = builder.build(&make_bars(&linear_closes(20))).unwrap();
        assert_eq!(table.len(), 20 - 3 - 4);
    }
}
