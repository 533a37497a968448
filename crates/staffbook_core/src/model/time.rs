//! Timestamp and calendar-date helpers.
//!
//! # Invariants
//! - Timestamps are UTC with microsecond precision, so the text form written
//!   to documents parses back to an equal value.
//! - `advance` never returns a value at or before its input.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, SubsecRound, Utc};

/// UTC instant used for every persisted timestamp.
pub type Timestamp = DateTime<Utc>;

/// Text format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current time truncated to microseconds.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

/// Returns a stamp strictly later than `previous`, preferring wall-clock time.
pub fn advance(previous: Timestamp) -> Timestamp {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Renders an RFC 3339 timestamp with microseconds and `Z`.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|parsed| parsed.with_timezone(&Utc))
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}
