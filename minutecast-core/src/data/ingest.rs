//! Minute bar ingestion from Parquet or CSV.
//!
//! The timestamp column may be a polars `Datetime`, an integer count of
//! epoch milliseconds, or a string (RFC 3339, or `YYYY-MM-DD HH:MM:SS`
//! read as UTC). Numeric columns are cast to their bar types; a null or a
//! value that does not cast is an error. Trade counts must be whole and
//! non-negative.

use super::schema::{BarSchema, SchemaError, COUNT_COLUMN, DEFAULT_TIMESTAMP_COLUMN};
use crate::domain::Bar;
use chrono::{DateTime, NaiveDateTime, Utc};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk bar file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Parquet,
    Csv,
}

impl FileFormat {
    /// Detect from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("parquet") | Some("pq") => Some(Self::Parquet),
            Some("csv") => Some(Self::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub timestamp_column: String,
    /// Overrides extension-based detection.
    pub format: Option<FileFormat>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            format: None,
        }
    }
}

/// Load minute bars, sorted ascending by timestamp.
///
/// Duplicate timestamps are kept; the feature builder rejects them.
pub fn load_bars(path: &Path, options: &IngestOptions) -> Result<Vec<Bar>, DataError> {
    let format = options
        .format
        .or_else(|| FileFormat::from_path(path))
        .ok_or_else(|| DataError::UnsupportedFormat(path.to_path_buf()))?;

    let df = match format {
        FileFormat::Parquet => {
            let file = File::open(path).map_err(|source| DataError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ParquetReader::new(file).finish()?
        }
        FileFormat::Csv => LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()?
            .collect()?,
    };

    let mut bars = dataframe_to_bars(&df, &options.timestamp_column)?;
    bars.sort_by_key(|b| b.timestamp);

    debug!(
        path = %path.display(),
        ?format,
        bars = bars.len(),
        "bars loaded"
    );
    Ok(bars)
}

/// Convert a bar DataFrame to `Bar`s in frame order.
pub fn dataframe_to_bars(df: &DataFrame, timestamp_column: &str) -> Result<Vec<Bar>, DataError> {
    BarSchema::validate(df, timestamp_column)?;

    let timestamps = read_timestamps(df.column(timestamp_column)?, timestamp_column)?;
    let open = read_f64(df, "open")?;
    let high = read_f64(df, "high")?;
    let low = read_f64(df, "low")?;
    let close = read_f64(df, "close")?;
    let vwap = read_f64(df, "vwap")?;
    let volume = read_f64(df, "volume")?;
    let usd_volume = read_f64(df, "usd_volume")?;
    let count = read_count(df, COUNT_COLUMN)?;

    Ok((0..df.height())
        .map(|i| Bar {
            timestamp: timestamps[i],
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
            vwap: vwap[i],
            volume: volume[i],
            usd_volume: usd_volume[i],
            count: count[i],
        })
        .collect())
}

fn read_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>, DataError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| null_value(name, row)))
        .collect()
}

fn read_count(df: &DataFrame, name: &str) -> Result<Vec<u64>, DataError> {
    read_f64(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
                Ok(v as u64)
            } else {
                Err(DataError::InvalidCount {
                    column: name.to_string(),
                    row,
                    value: v,
                })
            }
        })
        .collect()
}

fn null_value(column: &str, row: usize) -> DataError {
    DataError::NullValue {
        column: column.to_string(),
        row,
    }
}

fn read_timestamps(column: &Column, name: &str) -> Result<Vec<DateTime<Utc>>, DataError> {
    match column.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = column.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let v = v.ok_or_else(|| null_value(name, row))?;
                    let ts = match unit {
                        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
                        TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
                    };
                    ts.ok_or_else(|| DataError::InvalidTimestamp {
                        row,
                        value: v.to_string(),
                    })
                })
                .collect()
        }
        DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32 => {
            let raw = column.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let v = v.ok_or_else(|| null_value(name, row))?;
                    DateTime::from_timestamp_millis(v).ok_or_else(|| DataError::InvalidTimestamp {
                        row,
                        value: v.to_string(),
                    })
                })
                .collect()
        }
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                let v = v.ok_or_else(|| null_value(name, row))?;
                parse_timestamp(v).ok_or_else(|| DataError::InvalidTimestamp {
                    row,
                    value: v.to_string(),
                })
            })
            .collect(),
        other => Err(DataError::UnsupportedTimestamp {
            column: name.to_string(),
            dtype: other.to_string(),
        }),
    }
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS[.f]` taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported bar file format: {0} (expected .parquet or .csv)")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("null or non-numeric value in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("trade count {value} in column '{column}' at row {row} is not a non-negative integer")]
    InvalidCount {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("timestamp column '{column}' has unsupported type {dtype}")]
    UnsupportedTimestamp { column: String, dtype: String },

    #[error("unparseable timestamp '{value}' at row {row}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("polars: {0}")]
    Polars(#[from] PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_detection() {
        assert_eq!(
            FileFormat::from_path(Path::new("btc.parquet")),
            Some(FileFormat::Parquet)
        );
        assert_eq!(FileFormat::from_path(Path::new("btc.CSV")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("btc.json")), None);
    }

    #[test]
    fn parses_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 1, 7, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2021-03-01T07:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-03-01T09:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-03-01 07:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn dataframe_with_epoch_millis() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let df = DataFrame::new(vec![
            Column::new("ts".into(), vec![t0.timestamp_millis(), t0.timestamp_millis() + 60_000]),
            Column::new("open".into(), vec![1.0, 2.0]),
            Column::new("high".into(), vec![1.5, 2.5]),
            Column::new("low".into(), vec![0.5, 1.5]),
            Column::new("close".into(), vec![1.2, 2.2]),
            Column::new("vwap".into(), vec![1.1, 2.1]),
            Column::new("volume".into(), vec![10i64, 20]),
            Column::new("usd_volume".into(), vec![11.0, 44.0]),
            Column::new("count".into(), vec![3i64, 4]),
        ])
        .unwrap();

        let bars = dataframe_to_bars(&df, "ts").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, t0);
        assert_eq!(bars[1].timestamp, t0 + chrono::Duration::minutes(1));
        assert_eq!(bars[1].volume, 20.0);
        assert_eq!(bars[1].count, 4);
    }

    #[test]
    fn null_price_is_an_error() {
        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), vec![0i64]),
            Column::new("open".into(), vec![None::<f64>]),
            Column::new("high".into(), vec![1.0]),
            Column::new("low".into(), vec![1.0]),
            Column::new("close".into(), vec![1.0]),
            Column::new("vwap".into(), vec![1.0]),
            Column::new("volume".into(), vec![1.0]),
            Column::new("usd_volume".into(), vec![1.0]),
            Column::new("count".into(), vec![1u64]),
        ])
        .unwrap();

        let err = dataframe_to_bars(&df, "timestamp").unwrap_err();
        assert!(matches!(err, DataError::NullValue { ref column, row: 0 } if column == "open"));
    }

    fn frame_with_counts(count: Column) -> DataFrame {
        DataFrame::new(vec![
            Column::new("timestamp".into(), vec![0i64, 60_000]),
            Column::new("open".into(), vec![1.0, 1.0]),
            Column::new("high".into(), vec![1.0, 1.0]),
            Column::new("low".into(), vec![1.0, 1.0]),
            Column::new("close".into(), vec![1.0, 1.0]),
            Column::new("vwap".into(), vec![1.0, 1.0]),
            Column::new("volume".into(), vec![1.0, 1.0]),
            Column::new("usd_volume".into(), vec![1.0, 1.0]),
            count,
        ])
        .unwrap()
    }

    #[test]
    fn whole_float_counts_are_accepted() {
        let df = frame_with_counts(Column::new("count".into(), vec![3.0, 0.0]));
        let bars = dataframe_to_bars(&df, "timestamp").unwrap();
        assert_eq!(bars[0].count, 3);
        assert_eq!(bars[1].count, 0);
    }

    #[test]
    fn fractional_count_is_rejected() {
        let df = frame_with_counts(Column::new("count".into(), vec![2.0, 3.7]));
        let err = dataframe_to_bars(&df, "timestamp").unwrap_err();
        assert!(matches!(err, DataError::InvalidCount { row: 1, value, .. } if value == 3.7));
    }

    #[test]
    fn negative_count_is_rejected() {
        let df = frame_with_counts(Column::new("count".into(), vec![-1i64, 2]));
        let err = dataframe_to_bars(&df, "timestamp").unwrap_err();
        assert!(matches!(err, DataError::InvalidCount { row: 0, .. }));
    }
}
