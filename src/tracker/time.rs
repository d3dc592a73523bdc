//! Time helpers for session accounting.
//!
//! Session totals are kept as whole milliseconds, so instants entering the
//! tracker are truncated to millisecond precision. This keeps the ISO-8601
//! encoding lossless.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SiteTimeError;

const MILLIS_PER_MINUTE: u64 = 60_000;

// "<prefix>-YYYY-MM-DD"
static DATE_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>.+)-(?P<date>\d{4}-\d{2}-\d{2})$")
        .unwrap_or_else(|e| panic!("Invalid date key regex: {e}"))
});

/// Truncate an instant to whole milliseconds.
#[must_use]
pub fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}

/// Signed milliseconds between two instants.
#[must_use]
pub fn elapsed_millis(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    end.signed_duration_since(start).num_milliseconds()
}

/// Convert milliseconds to fractional minutes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn minutes_from_millis(millis: u64) -> f64 {
    millis as f64 / MILLIS_PER_MINUTE as f64
}

/// Format a millisecond total as hours and minutes.
///
/// Produces `"N min"`, `"N hr"`, or `"N hr, M min"`. Seconds are dropped.
#[must_use]
pub fn format_duration(millis: u64) -> String {
    let total_minutes = millis / MILLIS_PER_MINUTE;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours == 0 {
        format!("{minutes} min")
    } else if minutes == 0 {
        format!("{hours} hr")
    } else {
        format!("{hours} hr, {minutes} min")
    }
}

/// Format a millisecond total as a clock reading (`HH:MM:SS`).
#[must_use]
pub fn format_clock(millis: u64) -> String {
    let total_seconds = millis / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Encode an instant the way it is persisted (UTC, millisecond precision).
#[must_use]
pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an event timestamp.
///
/// Accepts an RFC 3339 instant with any offset, or integer milliseconds since
/// the Unix epoch. The result is truncated to millisecond precision.
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if the input is neither form.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, SiteTimeError> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(truncate_to_millis(parsed.with_timezone(&Utc)));
    }

    trimmed
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| SiteTimeError::Parse(format!("Invalid timestamp: {input}")))
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if the date is malformed.
pub fn parse_date(input: &str) -> Result<NaiveDate, SiteTimeError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| SiteTimeError::Parse(format!("Invalid date {input}: {e}")))
}

/// Build a per-day storage key such as `siteData-2025-05-09`.
#[must_use]
pub fn date_key(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}", date.format("%Y-%m-%d"))
}

/// Recover the date from a per-day key built with `prefix`.
///
/// Returns `None` for other keys, including backups such as
/// `siteData-2025-05-09.corrupt`.
#[must_use]
pub fn parse_date_key(prefix: &str, key: &str) -> Option<NaiveDate> {
    let captures = DATE_KEY_PATTERN.captures(key)?;
    if captures.name("prefix")?.as_str() != prefix {
        return None;
    }
    NaiveDate::parse_from_str(captures.name("date")?.as_str(), "%Y-%m-%d").ok()
}

/// The first instant of `date` in local time.
///
/// Where a DST jump skips midnight the first existing local time after it is
/// used.
#[must_use]
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map_or_else(|| Utc.from_utc_datetime(&midnight), |t| t.with_timezone(&Utc))
}

/// The local calendar date an instant falls on.
#[must_use]
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}
