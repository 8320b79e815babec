//! Dataset fingerprinting.
//!
//! A BLAKE3 digest over every field of every bar, in series order. Timestamps
//! enter at nanosecond resolution, so two bar series hash equal only if they
//! are bit-for-bit identical.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a bar series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn dataset_hash(bars: &[Bar]) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(bars.len() as u64).to_le_bytes());
    for bar in bars {
        hasher.update(&bar.timestamp.timestamp().to_le_bytes());
        hasher.update(&bar.timestamp.timestamp_subsec_nanos().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.vwap.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
        hasher.update(&bar.usd_volume.to_le_bytes());
        hasher.update(&bar.count.to_le_bytes());
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}
