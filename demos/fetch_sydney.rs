//! Fetches three full years plus the current year to date for Sydney, saves the
//! combined table and reads it back.

use chrono::{Datelike, Local};
use openmeteo_daily::{
    load_csv, save_frame, ArtifactKind, LatLon, LoadOptions, LogObserver, OpenMeteo,
    OpenMeteoError, RetryConfig, SaveOptions, ARCHIVE_BASE_URL, DATE_COLUMN,
};
use polars::prelude::*;
use std::env;
use std::path::Path;
use std::sync::Arc;

const DAILY_VARS: [&str; 4] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "windspeed_10m_max",
];

fn main() -> Result<(), OpenMeteoError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    configure_polars_display();

    let sydney = LatLon(-33.8688, 151.2093);
    let timezone = "Australia/Sydney";
    let raw_dir = Path::new("data/raw");
    let processed_dir = Path::new("data/processed");

    // Full years come from the archive endpoint.
    let session = openmeteo_daily::retry_session(&RetryConfig::default())?;
    let archive = OpenMeteo::builder(Arc::new(session))
        .base_url(ARCHIVE_BASE_URL)
        .build();
    let this_year = Local::now().year();

    let history = archive
        .fetch_years(this_year - 3..=this_year - 1)
        .location(sydney)
        .timezone(timezone)
        .daily_vars(&DAILY_VARS)
        .raw_dir(raw_dir)
        .call()?;
    println!("{}", history.head(Some(5)));

    let client = OpenMeteo::with_retries(&RetryConfig::default())?;
    let current = client
        .fetch_partial_year(this_year)
        .location(sydney)
        .timezone(timezone)
        .daily_vars(&DAILY_VARS)
        .raw_dir(raw_dir)
        .call();
    println!("{} days of {} so far", current.height(), this_year);

    let artifacts = save_frame(
        &history,
        "sydney_daily",
        processed_dir,
        &SaveOptions::default(),
        &LogObserver,
    )?;
    if let Some(csv) = artifacts.get(&ArtifactKind::Csv) {
        let reloaded = load_csv(csv, &LoadOptions::dates([DATE_COLUMN]))?;
        let summary = reloaded
            .lazy()
            .group_by([col("year")])
            .agg([
                col("temperature_2m_max").max().alias("hottest"),
                col("precipitation_sum").sum().alias("rain_mm"),
            ])
            .sort(["year"], SortMultipleOptions::default())
            .collect()
            .map_err(openmeteo_daily::WeatherDataError::from)?;
        println!("{summary}");
    }

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
