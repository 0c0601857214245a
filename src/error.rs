use std::path::PathBuf;

use thiserror::Error;

/// The source could not be read into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: {message}")]
    Malformed { row: usize, message: String },

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A date string did not match `DD-MM-YYYY`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: date '{value}' does not match DD-MM-YYYY")]
pub struct ParseError {
    /// 1-based data row in the source file.
    pub row: usize,
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Anything that aborts building a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
