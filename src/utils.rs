use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// Creates `path` (and parents) unless it already exists as a directory.
pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::create_dir_all(path),
        Err(e) => Err(e),
    }
}

/// Pretty-prints `value` as UTF-8 JSON with a two-space indent. Non-ASCII text is
/// written as-is, not escaped.
pub fn to_pretty_json(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parses a calendar day, dropping any time-of-day component.
///
/// Accepts `YYYY-MM-DD` and ISO date-times with or without seconds or an offset. For
/// offset date-times the local wall date is kept.
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op.
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_exists_rejects_files() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(ensure_dir_exists(&file).is_err());
    }

    #[test]
    fn test_parse_day_drops_time_of_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2);
        for text in [
            "2024-01-02",
            " 2024-01-02 ",
            "2024-01-02T06:30",
            "2024-01-02T06:30:15",
            "2024-01-02 23:59:59",
            "2024-01-02T23:00:00+10:00",
        ] {
            assert_eq!(parse_day(text), day, "{text}");
        }
        assert_eq!(parse_day("02/01/2024"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn test_pretty_json_keeps_unicode() {
        let text = to_pretty_json(&json!({"timezone": "Europe/Zürich", "n": [1]})).unwrap();
        assert!(text.contains("Zürich"));
        assert!(text.contains("\n  \"n\": [\n    1\n  ]"));
    }
}
