//! Bar: the fundamental market data unit.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One-minute OHLCV bar with VWAP, quote volume and trade count.
///
/// Bars are consumed as an ascending, duplicate-free slice. Gaps in the
/// minute grid are allowed; every derived series is index-position based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vwap: f64,
    /// Base-asset volume.
    pub volume: f64,
    /// Quote-asset volume.
    pub usd_volume: f64,
    /// Number of trades in the bar.
    pub count: u64,
}

impl Bar {
    /// Name of the first non-finite numeric field, if any.
    pub fn first_non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("vwap", self.vwap),
            ("volume", self.volume),
            ("usd_volume", self.usd_volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Basic OHLC sanity check: high >= low, open/close inside the range, positive prices.
    pub fn is_sane(&self) -> bool {
        if self.first_non_finite_field().is_some() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Malformed bar input. Never recovered: the caller must supply a clean series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("malformed input: timestamp at index {index} ({current}) is earlier than its predecessor ({previous})")]
    NonMonotonicTimestamp {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("malformed input: duplicate timestamp {timestamp} at index {index}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("malformed input: field '{field}' is not a finite number at index {index}")]
    NonFiniteField { index: usize, field: &'static str },
}

/// Check that a bar series is strictly ascending and fully numeric.
pub fn validate_series(bars: &[Bar]) -> Result<(), BarError> {
    for (index, bar) in bars.iter().enumerate() {
        if let Some(field) = bar.first_non_finite_field() {
            return Err(BarError::NonFiniteField { index, field });
        }
        if index == 0 {
            continue;
        }
        let previous = bars[index - 1].timestamp;
        if bar.timestamp == previous {
            return Err(BarError::DuplicateTimestamp {
                index,
                timestamp: bar.timestamp,
            });
        }
        if bar.timestamp < previous {
            return Err(BarError::NonMonotonicTimestamp {
                index,
                previous,
                current: bar.timestamp,
            });
        }
    }
    Ok(())
}

/// Number of places where consecutive bars are further apart than `interval`.
///
/// Gaps are reported, never filled.
pub fn count_gaps(bars: &[Bar], interval: Duration) -> usize {
    bars.windows(2)
        .filter(|pair| pair[1].timestamp - pair[0].timestamp > interval)
        .count()
}
