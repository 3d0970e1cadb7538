// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse a date or date-time the backend may hand out in several shapes.
///
/// Accepts RFC 3339, naive ISO date-times (assumed UTC), plain dates and the
/// reduced `YYYY-MM` / `YYYY` precisions the catalog uses for older episodes.
/// Anything else yields `None`.
pub fn parse_lenient_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for format in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return start_of_day(date);
    }

    // Month precision
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
        return start_of_day(date);
    }

    // Year precision
    if value.len() == 4
        && value.chars().all(|c| c.is_ascii_digit())
        && let Ok(year) = value.parse::<i32>()
    {
        return NaiveDate::from_ymd_opt(year, 1, 1).and_then(start_of_day);
    }

    None
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Serde adapter for optional, leniently formatted timestamps
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_lenient_datetime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_lenient_datetime("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_iso_timestamp_as_utc() {
        let dt = parse_lenient_datetime("2024-01-15T08:30:00.123456").unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(dt.timestamp(), Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap().timestamp());
    }

    #[test]
    fn parses_space_separated_timestamp() {
        let dt = parse_lenient_datetime("2024-01-15 08:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn parses_plain_date_as_midnight_utc() {
        let dt = parse_lenient_datetime("2024-01-15").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_reduced_precision_dates() {
        assert_eq!(
            parse_lenient_datetime("2019-07").unwrap(),
            Utc.with_ymd_and_hms(2019, 7, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_lenient_datetime("2019").unwrap(),
            Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_lenient_datetime("").is_none());
        assert!(parse_lenient_datetime("   ").is_none());
        assert!(parse_lenient_datetime("yesterday").is_none());
        assert!(parse_lenient_datetime("2024-13-45").is_none());
        assert!(parse_lenient_datetime("20245").is_none());
    }
}
