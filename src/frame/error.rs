use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Required column '{0}' not found in DataFrame")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Column '{0}' is not a reading column")]
    NotAReadingColumn(String),

    #[error("Reading column '{column}' does not carry an RFC 3339 timestamp")]
    InvalidReadingTimestamp {
        column: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Key column '{column}' is null at row {row}")]
    NullKey { column: &'static str, row: usize },
}
