//! Reading processed CSV files back into frames.

use crate::persistence::error::PersistenceError;
use crate::utils::parse_day;
use bon::Builder;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Options for [`load_csv`].
#[derive(Debug, Clone, Default, Builder)]
pub struct LoadOptions {
    /// Columns parsed as `DataType::Date`.
    #[builder(default)]
    pub parse_dates: Vec<String>,
    /// Explicit types for other columns; names absent from the file are ignored.
    #[builder(default)]
    pub dtypes: Vec<(String, DataType)>,
}

impl LoadOptions {
    /// Options that only parse `columns` as dates.
    pub fn dates<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parse_dates: columns.into_iter().map(Into::into).collect(),
            dtypes: Vec::new(),
        }
    }
}

/// Loads a CSV file with a header row.
///
/// Hinted date columns are read as text and converted to `DataType::Date`; values
/// carrying a time of day keep only their calendar day.
///
/// Fails with [`PersistenceError::NotFound`] when `path` does not exist, with
/// [`PersistenceError::MissingColumn`] when a date hint names a column the file lacks,
/// and with [`PersistenceError::DateParsing`] when a hinted value is not a date.
///
/// # Examples
///
/// ```no_run
/// use openmeteo_daily::{load_csv, LoadOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = LoadOptions::dates(["date"]);
/// let df = load_csv("data/processed/sydney_daily.csv", &options)?;
/// println!("{}", df.head(Some(5)));
/// # Ok(())
/// # }
/// ```
pub fn load_csv(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<DataFrame, PersistenceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PersistenceError::NotFound(path.to_path_buf()));
    }

    let header = read_csv(path, CsvReadOptions::default().with_n_rows(Some(1)))?;
    let present = |name: &str| header.get_column_index(name).is_some();

    if let Some(missing) = options.parse_dates.iter().find(|name| !present(name.as_str())) {
        return Err(PersistenceError::MissingColumn {
            path: path.to_path_buf(),
            column: missing.clone(),
        });
    }

    let mut overrides = Schema::default();
    for (name, dtype) in options.dtypes.iter().filter(|(name, _)| present(name.as_str())) {
        overrides.with_column(name.as_str().into(), dtype.clone());
    }
    for name in &options.parse_dates {
        overrides.with_column(name.as_str().into(), DataType::String);
    }

    let mut df = read_csv(
        path,
        CsvReadOptions::default().with_schema_overwrite(Some(Arc::new(overrides))),
    )?;
    for name in &options.parse_dates {
        let dates = date_series(&df, name, path)?;
        df.with_column(dates)
            .map_err(|e| PersistenceError::CsvRead(path.to_path_buf(), e))?;
    }
    Ok(df)
}

/// Re-parses the text column `name` as calendar days. Empty cells stay null.
fn date_series(df: &DataFrame, name: &str, path: &Path) -> Result<Series, PersistenceError> {
    let text = df
        .column(name)
        .and_then(|column| column.str().cloned())
        .map_err(|e| PersistenceError::CsvRead(path.to_path_buf(), e))?;

    let dates = text
        .iter()
        .map(|value| match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_day(value)
                .map(Some)
                .ok_or_else(|| PersistenceError::DateParsing {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                    value: value.to_string(),
                }),
        })
        .collect::<Result<Vec<Option<NaiveDate>>, _>>()?;
    Ok(Series::new(name.into(), dates))
}

fn read_csv(path: &Path, options: CsvReadOptions) -> Result<DataFrame, PersistenceError> {
    options
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| PersistenceError::CsvRead(path.to_path_buf(), e))
}
