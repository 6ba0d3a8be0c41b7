//! Shared traits, date ranges, and calendar helpers for budgeting primitives.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in a household snapshot.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Format used when persisting period boundaries, always at midnight UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT00:00:00.000Z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "range end {} must not be before start {}",
            self.end, self.start
        )
    }
}

impl std::error::Error for DateRangeError {}

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parses a persisted date value. Accepts plain dates and RFC 3339 or naive timestamps;
/// the time component is discarded.
pub fn parse_date_value(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.naive_utc().date());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|stamp| stamp.date())
}

/// Renders a date as a midnight timestamp string.
pub fn format_date_value(date: NaiveDate) -> String {
    date.format(TIMESTAMP_FORMAT).to_string()
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    date + Duration::days(1)
}

pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

/// Moves a date by whole months, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| previous_day(first_next).day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates_and_timestamps() {
        assert_eq!(parse_date_value("2024-01-10"), Some(date(2024, 1, 10)));
        assert_eq!(
            parse_date_value("2024-01-10T00:00:00.000Z"),
            Some(date(2024, 1, 10))
        );
        assert_eq!(
            parse_date_value("2024-01-10T15:30:00"),
            Some(date(2024, 1, 10))
        );
        assert_eq!(parse_date_value("not a date"), None);
        assert_eq!(parse_date_value("  "), None);
    }

    #[test]
    fn formatted_dates_parse_back() {
        let value = format_date_value(date(2024, 2, 29));
        assert_eq!(value, "2024-02-29T00:00:00.000Z");
        assert_eq!(parse_date_value(&value), Some(date(2024, 2, 29)));
    }

    #[test]
    fn add_months_clamps_to_month_length() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 12, 15), 1), date(2025, 1, 15));
        assert_eq!(add_months(date(2024, 1, 15), -1), date(2023, 12, 15));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(!range.contains(date(2024, 1, 2)));
    }
}
