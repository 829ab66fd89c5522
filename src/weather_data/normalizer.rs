//! Turns an Open-Meteo daily payload into a tidy per-day `DataFrame`.
//!
//! A payload without a usable `daily` block, or whose block has no `time` field, is not
//! an error: it yields [`DataFrame::empty`]. The first column of a non-empty result is
//! always `date` (`DataType::Date`), followed by the payload's variables in the order
//! the payload declares them.

use crate::events::{EventObserver, PipelineEvent};
use crate::utils::parse_day;
use crate::weather_data::error::WeatherDataError;
use chrono::{DateTime, NaiveDate};
use polars::prelude::*;
use serde_json::Value;

pub const DAILY_BLOCK: &str = "daily";
pub const TIME_FIELD: &str = "time";
pub const DATE_COLUMN: &str = "date";

/// Converts `payload` into a frame with one row per day.
pub fn daily_json_to_frame(
    payload: &Value,
    observer: &dyn EventObserver,
) -> Result<DataFrame, WeatherDataError> {
    let daily = match payload.get(DAILY_BLOCK).and_then(Value::as_object) {
        Some(daily) if !daily.is_empty() => daily,
        _ => {
            observer.on_event(&PipelineEvent::MissingDailyBlock);
            return Ok(DataFrame::empty());
        }
    };

    let Some(time) = daily.get(TIME_FIELD) else {
        observer.on_event(&PipelineEvent::MissingTimeField);
        return Ok(DataFrame::empty());
    };

    let mut columns: Vec<Column> = Vec::with_capacity(daily.len());
    columns.push(date_column(as_array(TIME_FIELD, time)?)?);
    for (name, values) in daily.iter().filter(|(name, _)| *name != TIME_FIELD) {
        columns.push(json_column(name, as_array(name, values)?));
    }

    Ok(DataFrame::new(columns)?)
}

fn as_array<'a>(name: &str, value: &'a Value) -> Result<&'a [Value], WeatherDataError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| WeatherDataError::NonArrayColumn {
            column: name.to_string(),
        })
}

fn date_column(values: &[Value]) -> Result<Column, WeatherDataError> {
    let dates = values
        .iter()
        .map(|value| match value {
            Value::Null => Ok(None),
            other => json_day(other)
                .map(Some)
                .ok_or_else(|| WeatherDataError::DateParsing {
                    value: other.to_string(),
                }),
        })
        .collect::<Result<Vec<Option<NaiveDate>>, _>>()?;

    Ok(Series::new(DATE_COLUMN.into(), dates).into())
}

/// A day from a date string (see [`parse_day`]) or integer Unix seconds.
fn json_day(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_day(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

/// Builds a typed column from a JSON array: Int64 when every value is an integer,
/// Float64 for other numbers, Boolean for booleans and String otherwise.
fn json_column(name: &str, values: &[Value]) -> Column {
    let non_null = || values.iter().filter(|v| !v.is_null());

    let series = if non_null().all(|v| v.is_i64()) && non_null().next().is_some() {
        Series::new(name.into(), values.iter().map(Value::as_i64).collect::<Vec<_>>())
    } else if non_null().all(Value::is_number) {
        Series::new(name.into(), values.iter().map(Value::as_f64).collect::<Vec<_>>())
    } else if non_null().all(Value::is_boolean) {
        Series::new(name.into(), values.iter().map(Value::as_bool).collect::<Vec<_>>())
    } else {
        let strings: Vec<Option<String>> = values
            .iter()
            .map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect();
        Series::new(name.into(), strings)
    };
    series.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingObserver;
    use crate::test_utils::{column_names, date_strings, sample_payload};
    use serde_json::json;

    #[test]
    fn test_well_formed_payload() -> Result<(), Box<dyn std::error::Error>> {
        let observer = RecordingObserver::new();
        let df = daily_json_to_frame(&sample_payload(), &observer)?;

        assert_eq!(df.height(), 2);
        assert_eq!(
            column_names(&df),
            vec!["date", "temperature_2m_max", "precipitation_sum", "weathercode"]
        );
        assert_eq!(df.column("date")?.dtype(), &DataType::Date);
        assert_eq!(date_strings(&df)?, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(df.column("temperature_2m_max")?.dtype(), &DataType::Float64);
        assert_eq!(df.column("weathercode")?.dtype(), &DataType::Int64);
        assert!(observer.events().is_empty());
        Ok(())
    }

    #[test]
    fn test_date_column_is_first_even_when_declared_last() -> Result<(), Box<dyn std::error::Error>>
    {
        let payload = json!({"daily": {"rain_sum": [1.5], "time": ["2024-03-01"]}});
        let df = daily_json_to_frame(&payload, &RecordingObserver::new())?;
        assert_eq!(column_names(&df), vec!["date", "rain_sum"]);
        Ok(())
    }

    #[test]
    fn test_missing_daily_block_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        for payload in [json!({}), json!({"daily": {}}), json!({"daily": [1, 2]}), json!([])] {
            let observer = RecordingObserver::new();
            let df = daily_json_to_frame(&payload, &observer)?;
            assert_eq!(df.height(), 0);
            assert_eq!(df.width(), 0);
            assert_eq!(observer.events(), vec![PipelineEvent::MissingDailyBlock]);
        }
        Ok(())
    }

    #[test]
    fn test_missing_time_field_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let observer = RecordingObserver::new();
        let payload = json!({"daily": {"temperature_2m_max": [30.1, 28.3]}});
        let df = daily_json_to_frame(&payload, &observer)?;
        assert_eq!(df.height(), 0);
        assert_eq!(observer.events(), vec![PipelineEvent::MissingTimeField]);
        Ok(())
    }

    #[test]
    fn test_time_of_day_is_normalized_away() -> Result<(), Box<dyn std::error::Error>> {
        let payload = json!({"daily": {
            "time": [
                "2024-01-01T00:00",
                "2024-01-02T13:45:10",
                "2024-01-03T23:00:00+10:00",
                1704412800,
                null
            ],
        }});
        let df = daily_json_to_frame(&payload, &RecordingObserver::new())?;
        let dates = df.column("date")?.cast(&DataType::String)?;
        let dates: Vec<Option<&str>> = dates.str()?.into_iter().collect();
        assert_eq!(
            dates,
            vec![
                Some("2024-01-01"),
                Some("2024-01-02"),
                Some("2024-01-03"),
                Some("2024-01-05"),
                None
            ]
        );
        Ok(())
    }

    #[test]
    fn test_column_types_follow_values() -> Result<(), Box<dyn std::error::Error>> {
        let payload = json!({"daily": {
            "time": ["2024-01-01", "2024-01-02"],
            "ints": [1, null],
            "mixed_numbers": [1, 2.5],
            "flags": [true, false],
            "labels": ["a", 3],
            "nothing": [null, null],
        }});
        let df = daily_json_to_frame(&payload, &RecordingObserver::new())?;
        assert_eq!(df.column("ints")?.dtype(), &DataType::Int64);
        assert_eq!(df.column("ints")?.null_count(), 1);
        assert_eq!(df.column("mixed_numbers")?.dtype(), &DataType::Float64);
        assert_eq!(df.column("flags")?.dtype(), &DataType::Boolean);
        assert_eq!(df.column("labels")?.dtype(), &DataType::String);
        assert_eq!(df.column("nothing")?.dtype(), &DataType::Float64);
        Ok(())
    }

    #[test]
    fn test_unparseable_date_is_an_error() {
        let payload = json!({"daily": {"time": ["yesterday"]}});
        let err = daily_json_to_frame(&payload, &RecordingObserver::new()).unwrap_err();
        assert!(matches!(err, WeatherDataError::DateParsing { .. }));
    }

    #[test]
    fn test_non_array_field_is_an_error() {
        let payload = json!({"daily": {"time": ["2024-01-01"], "units": "mm"}});
        let err = daily_json_to_frame(&payload, &RecordingObserver::new()).unwrap_err();
        assert!(matches!(err, WeatherDataError::NonArrayColumn { column } if column == "units"));
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let payload = json!({"daily": {"time": ["2024-01-01", "2024-01-02"], "x": [1.0]}});
        let err = daily_json_to_frame(&payload, &RecordingObserver::new()).unwrap_err();
        assert!(matches!(err, WeatherDataError::DataFrameProcessing(_)));
    }
}
