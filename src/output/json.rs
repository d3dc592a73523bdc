//! JSON output formatting for sitetime.

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{DaySummary, SiteRow};
use crate::error::SiteTimeError;
use crate::tracker::time::to_iso;
use crate::tracker::{TrackerState, Transition};

/// Format the site report as JSON
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_report_json(
    rows: &[SiteRow],
    title: &str,
    total: u64,
    active_url: Option<&str>,
) -> Result<String, SiteTimeError> {
    let output = json!({
        "title": title,
        "count": rows.len(),
        "totalTime": total,
        "activeUrl": active_url,
        "sites": rows
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format the stored days as JSON
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_days_json(days: &[DaySummary]) -> Result<String, SiteTimeError> {
    let output = json!({
        "count": days.len(),
        "days": days
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format the active session as JSON
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_status_json(state: &TrackerState, now: DateTime<Utc>) -> Result<String, SiteTimeError> {
    let output = json!({
        "active": state.is_active(),
        "activeUrl": state.active_url(),
        "sessionStart": state.session_start().map(to_iso),
        "elapsedMs": state.live_elapsed(now),
        "sites": state.sites().len(),
        "totalTime": state.total_tracked()
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a tracking event result as JSON
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_transition_json(transition: &Transition) -> Result<String, SiteTimeError> {
    Ok(serde_json::to_string_pretty(transition)?)
}

/// Format a normalization result as JSON
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_normalized_json(input: &str, site: Option<&str>) -> Result<String, SiteTimeError> {
    let output = json!({
        "input": input,
        "site": site
    });
    Ok(serde_json::to_string_pretty(&output)?)
}
