//! Construction of a single-year daily request.

use crate::types::lat_lon::LatLon;
use crate::weather_data::error::WeatherDataError;
use chrono::NaiveDate;

/// Open-Meteo forecast endpoint; serves the recent past and the near future.
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
/// Open-Meteo historical reanalysis endpoint.
pub const ARCHIVE_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// The quality-control variable appended to every request.
pub const WEATHER_CODE_VARIABLE: &str = "weathercode";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One daily request covering January 1st of `year` up to `end_date`, inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRequest {
    pub year: i32,
    pub location: LatLon,
    pub timezone: String,
    /// Requested variables, always ending with [`WEATHER_CODE_VARIABLE`].
    pub daily_vars: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DailyRequest {
    /// Builds a request; `end_date` defaults to December 31st of `year`.
    pub fn new(
        year: i32,
        location: LatLon,
        timezone: &str,
        daily_vars: &[&str],
        end_date: Option<NaiveDate>,
    ) -> Result<Self, WeatherDataError> {
        let start_date = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = end_date.or_else(|| NaiveDate::from_ymd_opt(year, 12, 31));
        let (start_date, end_date) = match (start_date, end) {
            (Some(start), Some(end)) if end >= start => (start, end),
            (start, end) => {
                return Err(WeatherDataError::InvalidDateRange { year, start, end });
            }
        };

        Ok(Self {
            year,
            location,
            timezone: timezone.to_string(),
            daily_vars: daily_variables(daily_vars),
            start_date,
            end_date,
        })
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.location.latitude().to_string()),
            ("longitude", self.location.longitude().to_string()),
            ("timezone", self.timezone.clone()),
            ("start_date", self.start_date.format(DATE_FORMAT).to_string()),
            ("end_date", self.end_date.format(DATE_FORMAT).to_string()),
            ("timeformat", "iso8601".to_string()),
            ("windspeed_unit", "kmh".to_string()),
            ("precipitation_unit", "mm".to_string()),
            ("daily", self.daily_vars.join(",")),
        ]
    }
}

/// De-duplicates `requested` (first occurrence wins) and appends the weather code
/// unless the caller already asked for it.
pub fn daily_variables(requested: &[&str]) -> Vec<String> {
    let mut vars: Vec<String> = Vec::with_capacity(requested.len() + 1);
    for var in requested {
        if !vars.iter().any(|v| v == var) {
            vars.push((*var).to_string());
        }
    }
    if !vars.iter().any(|v| v == WEATHER_CODE_VARIABLE) {
        vars.push(WEATHER_CODE_VARIABLE.to_string());
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sydney() -> LatLon {
        LatLon(-33.8688, 151.2093)
    }

    #[test]
    fn test_full_year_by_default() {
        let request = DailyRequest::new(2024, sydney(), "Australia/Sydney", &["a"], None).unwrap();
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_query_params() {
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let request = DailyRequest::new(
            2025,
            sydney(),
            "Australia/Sydney",
            &["temperature_2m_max", "precipitation_sum"],
            Some(end),
        )
        .unwrap();
        let params = request.query_params();
        let expected = vec![
            ("latitude", "-33.8688"),
            ("longitude", "151.2093"),
            ("timezone", "Australia/Sydney"),
            ("start_date", "2025-01-01"),
            ("end_date", "2025-01-31"),
            ("timeformat", "iso8601"),
            ("windspeed_unit", "kmh"),
            ("precipitation_unit", "mm"),
            ("daily", "temperature_2m_max,precipitation_sum,weathercode"),
        ];
        let actual: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_variables_are_deduplicated() {
        assert_eq!(
            daily_variables(&["b", "a", "b", "weathercode", "a"]),
            vec!["b", "a", "weathercode"]
        );
        assert_eq!(daily_variables(&[]), vec!["weathercode"]);
    }

    #[test]
    fn test_end_date_before_start_is_rejected() {
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let err = DailyRequest::new(2024, sydney(), "UTC", &[], Some(end)).unwrap_err();
        assert!(matches!(
            err,
            WeatherDataError::InvalidDateRange { year: 2024, .. }
        ));
    }

    #[test]
    fn test_unrepresentable_year_is_rejected() {
        let err = DailyRequest::new(i32::MAX, sydney(), "UTC", &[], None).unwrap_err();
        assert!(matches!(err, WeatherDataError::InvalidDateRange { .. }));
    }
}
