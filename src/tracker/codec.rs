//! Text encoding of tracker state.
//!
//! The persisted record is a JSON object:
//!
//! ```json
//! {"activeUrl":"a.com","sessionStart":"2025-04-01T10:00:00.000Z","sites":[{"url":"a.com","totalTime":60000}]}
//! ```
//!
//! `activeUrl` and `sessionStart` are both `null` when idle. Records written
//! by the browser extension used `startTime` and `urlList` for the last two
//! fields; those names are still read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use super::site::TrackedSite;
use super::state::{ActiveSession, TrackerState};
use super::time::{to_iso, truncate_to_millis};
use crate::error::SiteTimeError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateRecordRef<'a> {
    active_url: Option<&'a str>,
    #[serde(serialize_with = "serialize_instant")]
    session_start: Option<DateTime<Utc>>,
    sites: &'a [TrackedSite],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateRecord {
    #[serde(default)]
    active_url: Option<String>,
    #[serde(default, alias = "startTime", deserialize_with = "deserialize_instant")]
    session_start: Option<DateTime<Utc>>,
    #[serde(default, alias = "urlList")]
    sites: Vec<SiteRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteRecord {
    url: String,
    #[serde(default)]
    total_time: u64,
}

fn serialize_instant<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(instant) => serializer.serialize_str(&to_iso(*instant)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_instant<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| Some(truncate_to_millis(t.with_timezone(&Utc))))
            .map_err(|e| serde::de::Error::custom(format!("invalid instant {text:?}: {e}"))),
    }
}

/// Encode the state as its persisted text form.
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON encoding fails.
pub fn serialize(state: &TrackerState) -> Result<String, SiteTimeError> {
    let record = StateRecordRef {
        active_url: state.active_url(),
        session_start: state.session_start(),
        sites: state.sites(),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Decode a persisted record.
///
/// Duplicate site entries are merged by summing their totals.
///
/// # Errors
///
/// - `SiteTimeError::Parse` for invalid JSON, a bad timestamp, a negative or
///   fractional total, or a site entry with an empty url.
/// - `SiteTimeError::InconsistentState` when exactly one of `activeUrl` and
///   `sessionStart` is present.
pub fn deserialize(text: &str) -> Result<TrackerState, SiteTimeError> {
    let record: StateRecord = serde_json::from_str(text)?;

    let active_url = record.active_url.filter(|url| !url.trim().is_empty());
    let active = match (active_url, record.session_start) {
        (Some(url), Some(started_at)) => Some(ActiveSession { url, started_at }),
        (None, None) => None,
        (Some(url), None) => {
            return Err(SiteTimeError::InconsistentState(format!(
                "active url {url:?} has no session start"
            )))
        }
        (None, Some(started_at)) => {
            return Err(SiteTimeError::InconsistentState(format!(
                "session start {} has no active url",
                to_iso(started_at)
            )))
        }
    };

    let mut sites: Vec<TrackedSite> = Vec::with_capacity(record.sites.len());
    for entry in record.sites {
        if entry.url.trim().is_empty() {
            return Err(SiteTimeError::Parse("site entry with empty url".to_string()));
        }

        if let Some(existing) = sites.iter_mut().find(|s| s.url == entry.url) {
            warn!(url = %entry.url, "duplicate site entry in stored state, merging totals");
            existing.add_elapsed(entry.total_time);
        } else {
            sites.push(TrackedSite::with_time(entry.url, entry.total_time));
        }
    }

    Ok(TrackerState::from_parts(active, sites))
}
