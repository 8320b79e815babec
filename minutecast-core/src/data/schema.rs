use polars::prelude::*;

/// Price and volume columns every bar file must carry, besides the timestamp.
pub const VALUE_COLUMNS: [&str; 7] = ["open", "high", "low", "close", "vwap", "volume", "usd_volume"];

/// Trade-count column.
pub const COUNT_COLUMN: &str = "count";

/// Default name of the timestamp column.
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "timestamp";

/// Expected layout of minute bar files.
pub struct BarSchema;

impl BarSchema {
    /// Schema written by [`super::write_bars_parquet`].
    pub fn schema() -> Schema {
        let mut fields = vec![Field::new(
            DEFAULT_TIMESTAMP_COLUMN.into(),
            DataType::Datetime(TimeUnit::Milliseconds, None),
        )];
        fields.extend(
            VALUE_COLUMNS
                .iter()
                .map(|name| Field::new((*name).into(), DataType::Float64)),
        );
        fields.push(Field::new(COUNT_COLUMN.into(), DataType::UInt64));
        Schema::from_iter(fields)
    }

    /// Check that all required columns exist. Types are coerced later.
    pub fn validate(df: &DataFrame, timestamp_column: &str) -> Result<(), SchemaError> {
        let actual = df.schema();
        let required = std::iter::once(timestamp_column)
            .chain(VALUE_COLUMNS)
            .chain(std::iter::once(COUNT_COLUMN));
        for name in required {
            if !actual.contains(name) {
                return Err(SchemaError::MissingColumn(name.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_all_required_columns() {
        let schema = BarSchema::schema();
        assert_eq!(schema.len(), 9);
        assert!(schema.contains("timestamp"));
        assert!(schema.contains("vwap"));
        assert!(schema.contains("usd_volume"));
        assert!(schema.contains("count"));
    }

    #[test]
    fn validate_reports_missing_column() {
        let df = DataFrame::new(vec![
            Column::new("timestamp".into(), vec![0i64]),
            Column::new("open".into(), vec![1.0]),
        ])
        .unwrap();

        let err = BarSchema::validate(&df, "timestamp").unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn(ref c) if c == "high"));
    }
}
