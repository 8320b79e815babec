//! Parquet output for bar series.

use super::ingest::DataError;
use super::schema::{COUNT_COLUMN, DEFAULT_TIMESTAMP_COLUMN};
use crate::domain::Bar;
use polars::prelude::*;
use std::fs;
use std::path::Path;

/// Convert bars to a DataFrame in [`super::BarSchema`] layout.
pub fn bars_to_dataframe(bars: &[Bar]) -> Result<DataFrame, DataError> {
    let millis: Vec<i64> = bars.iter().map(|b| b.timestamp.timestamp_millis()).collect();
    let field = |f: fn(&Bar) -> f64| -> Vec<f64> { bars.iter().map(f).collect() };

    let df = DataFrame::new(vec![
        Column::new(DEFAULT_TIMESTAMP_COLUMN.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        Column::new("open".into(), field(|b| b.open)),
        Column::new("high".into(), field(|b| b.high)),
        Column::new("low".into(), field(|b| b.low)),
        Column::new("close".into(), field(|b| b.close)),
        Column::new("vwap".into(), field(|b| b.vwap)),
        Column::new("volume".into(), field(|b| b.volume)),
        Column::new("usd_volume".into(), field(|b| b.usd_volume)),
        Column::new(
            COUNT_COLUMN.into(),
            bars.iter().map(|b| b.count).collect::<Vec<u64>>(),
        ),
    ])?;
    Ok(df)
}

/// Write bars to a Parquet file.
///
/// The write is atomic: the frame goes to `{path}.tmp` and is renamed into place.
pub fn write_bars_parquet(bars: &[Bar], path: &Path) -> Result<(), DataError> {
    let mut df = bars_to_dataframe(bars)?;
    let tmp_path = path.with_extension("parquet.tmp");
    let io_err = |source| DataError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(&tmp_path).map_err(io_err)?;
    ParquetWriter::new(file).finish(&mut df)?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_err(e)
    })?;
    Ok(())
}
