use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeasonDataError {
    #[error("Failed to read data directory '{0}'")]
    DataDirRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to open season file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse CSV season file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Failed to read Parquet season file '{0}'")]
    ParquetRead(PathBuf, #[source] PolarsError),

    #[error("Missing required column '{column}' in season file '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Failed to convert column '{column}' in season file '{path}': {source}")]
    ColumnCast {
        path: PathBuf,
        column: String,
        source: PolarsError,
    },

    #[error("Unsupported season file format '{0}'")]
    UnsupportedFormat(PathBuf),

    // No dedicated file and no rows tagged with this season in any file
    #[error("No data found for season '{0}'")]
    SeasonNotFound(String),
}
