//! Fixtures shared by the unit tests.

use crate::http::error::TransportError;
use crate::http::transport::{Transport, TransportResponse};
use polars::prelude::*;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// A minimal Open-Meteo-like daily payload.
pub(crate) fn sample_payload() -> Value {
    json!({
        "latitude": -33.875,
        "longitude": 151.25,
        "timezone": "Australia/Sydney",
        "daily_units": {"time": "iso8601", "temperature_2m_max": "°C"},
        "daily": {
            "time": ["2024-01-01", "2024-01-02"],
            "temperature_2m_max": [30.1, 28.3],
            "precipitation_sum": [0.0, 5.2],
            "weathercode": [0, 61],
        }
    })
}

/// A payload whose `temperature_2m_max` counts up from `first_temp`, one value per date.
pub(crate) fn payload_for_dates(dates: &[&str], first_temp: f64) -> Value {
    let temps: Vec<f64> = (0..dates.len()).map(|i| first_temp + i as f64).collect();
    let codes: Vec<i64> = vec![3; dates.len()];
    json!({"daily": {"time": dates, "temperature_2m_max": temps, "weathercode": codes}})
}

pub(crate) fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// The `date` column rendered as `YYYY-MM-DD` strings.
pub(crate) fn date_strings(df: &DataFrame) -> PolarsResult<Vec<String>> {
    let dates = df.column("date")?.cast(&DataType::String)?;
    Ok(dates
        .str()?
        .into_no_null_iter()
        .map(str::to_owned)
        .collect())
}

/// An in-memory transport answering by the year in the `start_date` parameter.
pub(crate) struct ScriptedTransport {
    default_payload: Value,
    by_year: HashMap<i32, Value>,
    failing_years: HashSet<i32>,
    status_override: Option<u16>,
    requests: Mutex<Vec<Vec<(String, String)>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(default_payload: Value) -> Self {
        Self {
            default_payload,
            by_year: HashMap::new(),
            failing_years: HashSet::new(),
            status_override: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_year(mut self, year: i32, payload: Value) -> Self {
        self.by_year.insert(year, payload);
        self
    }

    /// Answers requests for `year` with a 500.
    pub(crate) fn failing_year(mut self, year: i32) -> Self {
        self.failing_years.insert(year);
        self
    }

    /// Answers every request with `status` and an empty body.
    pub(crate) fn with_status(mut self, status: u16) -> Self {
        self.status_override = Some(status);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Vec<(String, String)>> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn param(request: &[(String, String)], key: &str) -> Option<String> {
        request
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

impl Transport for ScriptedTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let params: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let year = Self::param(&params, "start_date")
            .and_then(|d| d.get(..4).and_then(|y| y.parse::<i32>().ok()));
        self.requests.lock().unwrap().push(params);

        if let Some(status) = self.status_override {
            return Ok(TransportResponse::new(url, status, Vec::new()));
        }
        if year.is_some_and(|y| self.failing_years.contains(&y)) {
            return Ok(TransportResponse::new(url, 500, Vec::new()));
        }
        let payload = year
            .and_then(|y| self.by_year.get(&y))
            .unwrap_or(&self.default_payload);
        Ok(TransportResponse::new(
            url,
            200,
            serde_json::to_vec(payload).unwrap(),
        ))
    }
}
