use chrono::NaiveDate;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherDataError {
    #[error("Failed to create raw payload directory '{0}'")]
    RawDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write raw payload file '{0}'")]
    RawPayloadWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode raw payload for year {year}")]
    RawPayloadEncode {
        year: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid date range for year {year}: {start:?} to {end:?}")]
    InvalidDateRange {
        year: i32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },

    #[error("Daily field '{column}' is not an array")]
    NonArrayColumn { column: String },

    #[error("Could not parse '{value}' as a date")]
    DateParsing { value: String },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
