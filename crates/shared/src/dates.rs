//! Lenient date parsing for "date-like" field values.
//!
//! Accepted shapes: RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]`
//! (read as UTC), `YYYY-MM-DD`, `MM/DD/YYYY`, and numeric epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a JSON value into a UTC timestamp when it looks like a date.
pub fn parse_date_like(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_date_str(text),
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Parse a string into a UTC timestamp when it looks like a date.
pub fn parse_date_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    NAIVE_DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| datetime.and_utc())
    })
}

/// Canonical wire encoding for timestamps (RFC 3339, millisecond precision).
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use serde_json::json;

    #[test]
    fn parses_supported_shapes() {
        let expected = Utc.with_ymd_and_hms(1995, 4, 19, 0, 0, 0).single();
        assert_eq!(parse_date_like(&json!("1995-04-19")), expected);
        assert_eq!(parse_date_like(&json!("04/19/1995")), expected);
        assert_eq!(parse_date_like(&json!("1995-04-19T00:00:00")), expected);
        assert_eq!(parse_date_like(&json!("1995-04-19T00:00:00.000Z")), expected);
        assert_eq!(parse_date_like(&json!("1995-04-19T02:00:00+02:00")), expected);
    }

    #[test]
    fn parses_epoch_millis() {
        let parsed = parse_date_like(&json!(0));
        assert_eq!(parsed.map(|date| date.year()), Some(1970));
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_date_like(&json!("asd")), None);
        assert_eq!(parse_date_like(&json!("")), None);
        assert_eq!(parse_date_like(&json!(true)), None);
        assert_eq!(parse_date_like(&Value::Null), None);
        assert_eq!(parse_date_like(&json!("1995-13-40")), None);
    }

    #[test]
    fn formats_with_millis_and_zulu() {
        let date = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).single();
        assert_eq!(
            date.as_ref().map(format_date).as_deref(),
            Some("2020-01-02T03:04:05.000Z")
        );
    }
}
