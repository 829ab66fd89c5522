//! This module provides the main entry point: the [`OpenMeteo`] client.
//!
//! It fetches daily observations for a location one calendar year at a time, keeps
//! every raw response on disk, and assembles the years into a single date-ordered
//! `DataFrame` annotated with where and when the data came from.

use crate::error::OpenMeteoError;
use crate::events::{EventObserver, LogObserver, PipelineEvent};
use crate::http::session::{retry_session, RetryConfig};
use crate::http::transport::Transport;
use crate::types::lat_lon::LatLon;
use crate::utils::{ensure_dir_exists, to_pretty_json};
use crate::weather_data::error::WeatherDataError;
use crate::weather_data::normalizer::{daily_json_to_frame, DATE_COLUMN};
use crate::weather_data::request::{DailyRequest, DEFAULT_BASE_URL};
use bon::bon;
use chrono::{Local, NaiveDate};
use polars::prelude::*;
use serde_json::Value;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const YEAR_COLUMN: &str = "year";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const TIMEZONE_COLUMN: &str = "timezone";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Pause after each year of a multi-year fetch.
pub const DEFAULT_YEARS_SLEEP: Duration = Duration::from_secs(1);
/// Pause after a partial-year fetch.
pub const DEFAULT_PARTIAL_SLEEP: Duration = Duration::from_millis(500);

/// Client for Open-Meteo daily data.
///
/// The client owns a [`Transport`] (normally a [`crate::RetryingSession`]), the endpoint,
/// the per-request timeout and the [`EventObserver`] that receives progress and
/// failure reports. All calls block the current thread; there is no concurrency.
///
/// # Examples
///
/// ```no_run
/// use openmeteo_daily::{LatLon, OpenMeteo, OpenMeteoError, RetryConfig};
/// use std::path::Path;
///
/// # fn main() -> Result<(), OpenMeteoError> {
/// let client = OpenMeteo::with_retries(&RetryConfig::default())?;
/// let df = client
///     .fetch_years(2021..=2023)
///     .location(LatLon(-33.8688, 151.2093))
///     .timezone("Australia/Sydney")
///     .daily_vars(&["temperature_2m_max", "precipitation_sum"])
///     .raw_dir(Path::new("data/raw"))
///     .call()?;
/// println!("{}", df.head(Some(5)));
/// # Ok(())
/// # }
/// ```
pub struct OpenMeteo {
    transport: Arc<dyn Transport>,
    base_url: String,
    timeout: Duration,
    observer: Arc<dyn EventObserver>,
}

#[bon]
impl OpenMeteo {
    /// Creates a client around `transport`.
    ///
    /// Optional builder members:
    /// *   `.base_url(..)`: endpoint (default [`DEFAULT_BASE_URL`]).
    /// *   `.timeout(Duration)`: per-request timeout (default 60 s).
    /// *   `.observer(Arc<dyn EventObserver>)`: event sink (default [`LogObserver`]).
    #[builder]
    pub fn new(
        #[builder(start_fn)] transport: Arc<dyn Transport>,
        #[builder(into, default = DEFAULT_BASE_URL.to_string())] base_url: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(default = Arc::new(LogObserver) as Arc<dyn EventObserver>)] observer: Arc<
            dyn EventObserver,
        >,
    ) -> Self {
        Self {
            transport,
            base_url,
            timeout,
            observer,
        }
    }

    /// Creates a client with default settings over a [`crate::RetryingSession`] built
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenMeteoError::Transport`] if the HTTP client cannot be built.
    pub fn with_retries(config: &RetryConfig) -> Result<Self, OpenMeteoError> {
        let session = retry_session(config)?;
        Ok(Self::builder(Arc::new(session)).build())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches the raw daily payload for one year.
    ///
    /// The request covers January 1st of `year` through `end_date` (default December
    /// 31st) and always asks for `weathercode` in addition to `daily_vars`. The parsed
    /// body is returned unmodified.
    ///
    /// # Errors
    ///
    /// *   [`OpenMeteoError::WeatherData`] if the date range is invalid.
    /// *   [`OpenMeteoError::Transport`] on connection failure, on a 4xx/5xx status once
    ///     retries are exhausted, or if the body is not JSON.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use openmeteo_daily::{LatLon, OpenMeteo, OpenMeteoError, RetryConfig};
    /// # fn main() -> Result<(), OpenMeteoError> {
    /// let client = OpenMeteo::with_retries(&RetryConfig::default())?;
    /// let payload = client
    ///     .fetch_year(2024)
    ///     .location(LatLon(52.52, 13.40))
    ///     .timezone("Europe/Berlin")
    ///     .daily_vars(&["temperature_2m_mean"])
    ///     .call()?;
    /// println!("{}", payload["daily"]["time"][0]);
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = fetch_year)]
    #[doc(hidden)]
    pub fn build_fetch_year(
        &self,
        #[builder(start_fn)] year: i32,
        location: LatLon,
        timezone: &str,
        daily_vars: &[&str],
        end_date: Option<NaiveDate>,
    ) -> Result<Value, OpenMeteoError> {
        let request = DailyRequest::new(year, location, timezone, daily_vars, end_date)?;
        self.send(&request)
    }

    /// Fetches every year in `years` and returns them as one frame.
    ///
    /// Years are fetched sequentially. Each successful response is written verbatim to
    /// `<raw_dir>/open_meteo_daily_<year>.json` before it is normalized. A year that
    /// fails (network, status, malformed payload) or yields no rows is reported to the
    /// observer and skipped; it never aborts the batch. The politeness delay `sleep`
    /// (default 1 s) follows every year, successful or not.
    ///
    /// The result is sorted by date and carries `year`, `latitude`, `longitude` and
    /// `timezone` columns. When several rows share a date, the one from the earliest
    /// fetched year is kept. If no year produced rows, the frame is empty.
    ///
    /// # Errors
    ///
    /// Only failures outside the per-year loop are returned: creating `raw_dir`, or
    /// combining the yearly frames.
    #[builder(start_fn = fetch_years)]
    #[doc(hidden)]
    pub fn build_fetch_years(
        &self,
        #[builder(start_fn)] years: RangeInclusive<i32>,
        location: LatLon,
        timezone: &str,
        daily_vars: &[&str],
        raw_dir: &Path,
        #[builder(default = DEFAULT_YEARS_SLEEP)] sleep: Duration,
    ) -> Result<DataFrame, OpenMeteoError> {
        ensure_dir_exists(raw_dir)
            .map_err(|e| WeatherDataError::RawDirCreation(raw_dir.to_path_buf(), e))?;

        let mut frames: Vec<LazyFrame> = Vec::new();
        for year in years.clone() {
            let raw_path = raw_payload_path(raw_dir, year, false);
            match self.fetch_and_store(year, location, timezone, daily_vars, None, &raw_path) {
                Ok(df) if df.height() == 0 => {
                    self.observer.on_event(&PipelineEvent::EmptyYear { year });
                }
                Ok(df) => frames.push(df.lazy().with_column(lit(year).alias(YEAR_COLUMN))),
                Err(e) => self.observer.on_event(&PipelineEvent::YearFailed {
                    year,
                    error: e.to_string(),
                }),
            }
            self.politeness_delay(sleep);
        }

        if frames.is_empty() {
            self.observer.on_event(&PipelineEvent::NoData {
                start_year: *years.start(),
                end_year: *years.end(),
            });
            return Ok(DataFrame::empty());
        }

        Ok(self.assemble(frames, location, timezone)?)
    }

    /// Fetches one year up to `until` (default: yesterday) and returns it as a frame.
    ///
    /// The raw response goes to `<raw_dir>/open_meteo_daily_<year>_partial.json`. Rows
    /// are annotated like [`OpenMeteo::fetch_years`] and de-duplicated by date, keeping
    /// the first. This never fails: any error is reported to the observer and an empty
    /// frame is returned. The politeness delay `sleep` (default 0.5 s) runs exactly
    /// once, on success and on failure.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use openmeteo_daily::{LatLon, OpenMeteo, OpenMeteoError, RetryConfig};
    /// # use std::path::Path;
    /// # fn main() -> Result<(), OpenMeteoError> {
    /// let client = OpenMeteo::with_retries(&RetryConfig::default())?;
    /// let this_year = client
    ///     .fetch_partial_year(2026)
    ///     .location(LatLon(-33.8688, 151.2093))
    ///     .timezone("Australia/Sydney")
    ///     .daily_vars(&["temperature_2m_max"])
    ///     .raw_dir(Path::new("data/raw"))
    ///     .call();
    /// println!("{} days so far", this_year.height());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = fetch_partial_year)]
    #[doc(hidden)]
    pub fn build_fetch_partial_year(
        &self,
        #[builder(start_fn)] year: i32,
        location: LatLon,
        timezone: &str,
        daily_vars: &[&str],
        raw_dir: &Path,
        until: Option<NaiveDate>,
        #[builder(default = DEFAULT_PARTIAL_SLEEP)] sleep: Duration,
    ) -> DataFrame {
        let until = until.unwrap_or_else(yesterday);
        self.observer
            .on_event(&PipelineEvent::PartialYearRequested { year, until });

        let result = self.partial_year_frame(year, location, timezone, daily_vars, raw_dir, until);
        self.politeness_delay(sleep);

        match result {
            Ok(df) => df,
            Err(e) => {
                self.observer.on_event(&PipelineEvent::PartialYearFailed {
                    year,
                    error: e.to_string(),
                });
                DataFrame::empty()
            }
        }
    }
}

impl OpenMeteo {
    /// Normalizes a raw payload with this client's observer.
    /// See [`daily_json_to_frame`].
    pub fn normalize(&self, payload: &Value) -> Result<DataFrame, OpenMeteoError> {
        Ok(daily_json_to_frame(payload, &*self.observer)?)
    }

    fn send(&self, request: &DailyRequest) -> Result<Value, OpenMeteoError> {
        let params = request.query_params();
        self.observer.on_event(&PipelineEvent::Requesting {
            year: request.year,
            url: self.base_url.clone(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });

        let response = self
            .transport
            .get(&self.base_url, &params, self.timeout)?
            .error_for_status()?;
        Ok(response.json()?)
    }

    /// Fetch, write the raw payload, normalize.
    fn fetch_and_store(
        &self,
        year: i32,
        location: LatLon,
        timezone: &str,
        daily_vars: &[&str],
        end_date: Option<NaiveDate>,
        raw_path: &Path,
    ) -> Result<DataFrame, OpenMeteoError> {
        let payload = self
            .fetch_year(year)
            .location(location)
            .timezone(timezone)
            .daily_vars(daily_vars)
            .maybe_end_date(end_date)
            .call()?;
        write_raw_payload(&payload, year, raw_path)?;
        self.observer.on_event(&PipelineEvent::RawPayloadSaved {
            year,
            path: raw_path.to_path_buf(),
        });
        self.normalize(&payload)
    }

    fn partial_year_frame(
        &self,
        year: i32,
        location: LatLon,
        timezone: &str,
        daily_vars: &[&str],
        raw_dir: &Path,
        until: NaiveDate,
    ) -> Result<DataFrame, OpenMeteoError> {
        ensure_dir_exists(raw_dir)
            .map_err(|e| WeatherDataError::RawDirCreation(raw_dir.to_path_buf(), e))?;

        let raw_path = raw_payload_path(raw_dir, year, true);
        let df = self.fetch_and_store(
            year,
            location,
            timezone,
            daily_vars,
            Some(until),
            &raw_path,
        )?;
        if df.height() == 0 {
            self.observer
                .on_event(&PipelineEvent::EmptyPartialYear { year });
            return Ok(DataFrame::empty());
        }

        let df = df
            .lazy()
            .with_column(lit(year).alias(YEAR_COLUMN))
            .with_columns(location_columns(location, timezone))
            .collect()
            .map_err(WeatherDataError::from)?;
        Ok(drop_duplicate_dates(df, &*self.observer)?)
    }

    /// Concatenates the yearly frames, sorts by date and annotates the location.
    fn assemble(
        &self,
        frames: Vec<LazyFrame>,
        location: LatLon,
        timezone: &str,
    ) -> Result<DataFrame, WeatherDataError> {
        let union = UnionArgs {
            rechunk: true,
            to_supertypes: true,
            ..Default::default()
        };
        // The sort must be stable: duplicates are resolved by position afterwards.
        let df = concat_lf_diagonal(frames, union)?
            .sort_by_exprs(
                [col(DATE_COLUMN)],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .with_columns(location_columns(location, timezone))
            .collect()?;
        drop_duplicate_dates(df, &*self.observer)
    }

    fn politeness_delay(&self, delay: Duration) {
        self.observer
            .on_event(&PipelineEvent::PolitenessDelay { delay });
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// `<raw_dir>/open_meteo_daily_<year>.json`, or `..._<year>_partial.json`.
pub fn raw_payload_path(raw_dir: &Path, year: i32, partial: bool) -> PathBuf {
    let suffix = if partial { "_partial" } else { "" };
    raw_dir.join(format!("open_meteo_daily_{year}{suffix}.json"))
}

fn write_raw_payload(payload: &Value, year: i32, path: &Path) -> Result<(), WeatherDataError> {
    let text = to_pretty_json(payload)
        .map_err(|e| WeatherDataError::RawPayloadEncode { year, source: e })?;
    fs::write(path, text).map_err(|e| WeatherDataError::RawPayloadWrite(path.to_path_buf(), e))
}

fn location_columns(location: LatLon, timezone: &str) -> [Expr; 3] {
    [
        lit(location.latitude()).alias(LATITUDE_COLUMN),
        lit(location.longitude()).alias(LONGITUDE_COLUMN),
        lit(timezone.to_string()).alias(TIMEZONE_COLUMN),
    ]
}

/// Keeps the first row for every date, preserving row order.
fn drop_duplicate_dates(
    df: DataFrame,
    observer: &dyn EventObserver,
) -> Result<DataFrame, WeatherDataError> {
    let unique = df
        .column(DATE_COLUMN)?
        .as_materialized_series()
        .n_unique()?;
    let count = df.height().saturating_sub(unique);
    if count == 0 {
        return Ok(df);
    }

    observer.on_event(&PipelineEvent::DuplicateDates { count });
    Ok(df
        .lazy()
        .unique_stable(Some(vec![DATE_COLUMN.into()]), UniqueKeepStrategy::First)
        .collect()?)
}

fn yesterday() -> NaiveDate {
    let today = Local::now().date_naive();
    today.pred_opt().unwrap_or(today)
}
