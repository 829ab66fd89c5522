use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("CSV not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to create file '{0}'")]
    FileCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV file '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to write parquet file '{0}'")]
    ParquetWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Column '{column}' requested as a date column is missing from '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Could not parse '{value}' in date column '{column}' of '{path}'")]
    DateParsing {
        path: PathBuf,
        column: String,
        value: String,
    },
}
