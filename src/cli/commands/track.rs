//! Event commands: feed browser events into the tracker.

use chrono::{DateTime, Utc};

use crate::cli::args::OutputFormat;
use crate::error::SiteTimeError;
use crate::output::{format_status, format_transition};
use crate::tracker::{KeyValueStore, SiteTracker, TrackerEvent};

/// Apply one event and describe what changed.
///
/// # Errors
///
/// Returns an error if the tracker refuses the transition or the write fails.
pub fn track<S: KeyValueStore>(
    tracker: &mut SiteTracker<S>,
    event: TrackerEvent,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    let transition = tracker.handle(event)?;
    format_transition(&transition, format)
}

/// Execute status command
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn status<S: KeyValueStore>(
    tracker: &SiteTracker<S>,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    format_status(tracker.state(), now, format)
}
