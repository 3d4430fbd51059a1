//! Centralized datetime parsing and formatting
//!
//! Provider timestamps arrive in RFC3339; SQLite hands back either RFC3339
//! or its space-separated form depending on how the value was written. Both
//! go through here so the rest of the crate only ever sees `DateTime<Utc>`.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Errors that can occur during datetime operations
#[derive(Error, Debug)]
pub enum DateTimeError {
    /// Invalid datetime format provided
    #[error("Invalid datetime format: '{input}' - expected RFC3339 (2023-01-01T12:00:00Z) or SQLite (2023-01-01 12:00:00)")]
    InvalidFormat { input: String },
}

/// Parse a datetime from the formats seen at the provider and storage
/// boundaries, normalizing to UTC.
pub fn parse_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DateTimeError> {
    let trimmed = datetime_str.trim();

    // RFC3339 first: the provider's format.
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    // SQLite's naive format, assumed UTC.
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    Err(DateTimeError::InvalidFormat {
        input: trimmed.to_string(),
    })
}

/// Format a datetime for storage. Fixed-width RFC3339 in UTC keeps string
/// ordering consistent with chronological ordering, which the day-window
/// queries and the dedup's most-recent-wins rule rely on. Microsecond
/// precision distinguishes runs that land within the same second.
pub fn format_for_storage(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_flexible("2023-01-01T12:00:00Z").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_parse_with_offset_converts_to_utc() {
        let dt = parse_flexible("2023-01-01T12:00:00+09:00").unwrap();
        assert_eq!(dt.hour(), 3);
    }

    #[test]
    fn test_parse_sqlite_format() {
        let dt = parse_flexible("2023-01-01 12:00:00").unwrap();
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_invalid_format() {
        let result = parse_flexible("not-a-date");
        assert!(matches!(
            result,
            Err(DateTimeError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_storage_round_trip() {
        let dt = Utc.with_ymd_and_hms(2023, 6, 15, 8, 30, 0).unwrap();
        let stored = format_for_storage(&dt);
        assert_eq!(parse_flexible(&stored).unwrap(), dt);
    }
}
