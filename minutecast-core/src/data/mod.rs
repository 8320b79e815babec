//! Bar file ingestion and Parquet output

pub mod ingest;
pub mod parquet;
pub mod schema;

pub use ingest::{
    dataframe_to_bars, load_bars, parse_timestamp, DataError, FileFormat, IngestOptions,
};
pub use parquet::{bars_to_dataframe, write_bars_parquet};
pub use schema::{BarSchema, SchemaError, DEFAULT_TIMESTAMP_COLUMN};
