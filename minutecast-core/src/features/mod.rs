//! Feature columns derived from a bar series.
//!
//! Every column implements [`Feature`]: a pure function from the full bar
//! slice to a same-length `Vec<f64>`. Undefined positions are `f64::NAN`.
//! The first `lookback()` values are always undefined.
//!
//! # Look-ahead contamination guard
//! No feature value at bar t may depend on bar t+1 or later. Every feature
//! must pass the truncated-vs-full series test. The forward label lives in
//! [`crate::label`] and is deliberately not a `Feature`.

pub mod calendar;
pub mod intrabar;
pub mod returns;
pub mod rolling;
pub mod scan;

pub use calendar::{Session, SessionFlag, TimeWindow, Weekend};
pub use intrabar::{Raw, Spread, VolumePerTrade};
pub use returns::{LagReturn, PctChange};
pub use rolling::MeanReturn;

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Trait for feature columns.
pub trait Feature: Send + Sync {
    /// Output column name (e.g., "close_returns", "MA15").
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the column for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Numeric bar field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Vwap,
    Volume,
    UsdVolume,
    Count,
}

impl BarField {
    pub fn value(self, bar: &Bar) -> f64 {
        match self {
            BarField::Open => bar.open,
            BarField::High => bar.high,
            BarField::Low => bar.low,
            BarField::Close => bar.close,
            BarField::Vwap => bar.vwap,
            BarField::Volume => bar.volume,
            BarField::UsdVolume => bar.usd_volume,
            BarField::Count => bar.count as f64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BarField::Open => "open",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Close => "close",
            BarField::Vwap => "vwap",
            BarField::Volume => "volume",
            BarField::UsdVolume => "usd_volume",
            BarField::Count => "count",
        }
    }

    /// Extract this field across a bar slice.
    pub fn series(self, bars: &[Bar]) -> Vec<f64> {
        bars.iter().map(|b| self.value(b)).collect()
    }
}

/// Create synthetic minute bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high/low = ±1 around the
/// body, vwap = midpoint of open and close, volume = 10, count = 5.
/// Timestamps start on Tuesday 2024-01-02 00:00 UTC, one minute apart.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::TimeZone;
    let start = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + chrono::Duration::minutes(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                vwap: (open + close) / 2.0,
                volume: 10.0,
                usd_volume: 10.0 * close,
                count: 5,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for feature tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-12;
