//! Data management commands: export, import, reset.

use tracing::info;

use crate::error::SiteTimeError;
use crate::tracker::{deserialize, serialize, KeyValueStore, SiteTracker};

/// Print the current record in its persisted form.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn export<S: KeyValueStore>(tracker: &SiteTracker<S>) -> Result<String, SiteTimeError> {
    serialize(tracker.state())
}

/// Validate `text` as a record and store it.
///
/// Existing data is only replaced with `force`.
///
/// # Errors
///
/// Returns a parse error for an invalid record, `SiteTimeError::Refused` if
/// data exists and `force` is not set, or a storage error.
pub fn import<S: KeyValueStore>(
    tracker: &mut SiteTracker<S>,
    text: &str,
    force: bool,
) -> Result<String, SiteTimeError> {
    let state = deserialize(text)?;

    let has_data = !tracker.sites().is_empty() || tracker.state().is_active();
    if has_data && !force {
        return Err(SiteTimeError::Refused(format!(
            "{} already holds {} sites; pass --force to replace them",
            tracker.key(),
            tracker.sites().len()
        )));
    }

    let sites = state.sites().len();
    tracker.replace_state(state)?;
    info!(key = tracker.key(), sites, "imported tracker state");

    Ok(format!("Imported {sites} sites into {}", tracker.key()))
}

/// Clear all tracked data.
///
/// # Errors
///
/// Returns `SiteTimeError::Refused` without `force`, or a storage error.
pub fn reset<S: KeyValueStore>(
    tracker: &mut SiteTracker<S>,
    force: bool,
) -> Result<String, SiteTimeError> {
    if !force {
        return Err(SiteTimeError::Refused(
            "reset deletes all tracked time; pass --force to confirm".to_string(),
        ));
    }

    if tracker.reset()? {
        Ok(format!("Removed {}", tracker.key()))
    } else {
        Ok("Nothing to reset".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::MemoryStore;
    use chrono::{TimeZone, Utc};

    const RECORD: &str = r#"{"activeUrl":null,"sessionStart":null,"sites":[{"url":"a.com","totalTime":1800000}]}"#;

    #[test]
    fn test_import_then_export() {
        let mut tracker = SiteTracker::new(MemoryStore::new(), "siteData");

        let message = import(&mut tracker, RECORD, false).unwrap();

        assert_eq!(message, "Imported 1 sites into siteData");
        assert_eq!(export(&tracker).unwrap(), RECORD);
        assert_eq!(tracker.store().get("siteData").unwrap().as_deref(), Some(RECORD));
    }

    #[test]
    fn test_import_requires_force_over_existing_data() {
        let mut tracker = SiteTracker::new(MemoryStore::new(), "siteData");
        tracker
            .switch_to("https://b.com/", Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap())
            .unwrap();

        let refused = import(&mut tracker, RECORD, false);
        assert!(matches!(refused, Err(SiteTimeError::Refused(_))));
        assert_eq!(tracker.state().active_url(), Some("b.com"));

        import(&mut tracker, RECORD, true).unwrap();
        assert!(!tracker.state().is_active());
        assert_eq!(tracker.state().total_time("a.com"), 1_800_000);
    }

    #[test]
    fn test_import_rejects_invalid_record() {
        let mut tracker = SiteTracker::new(MemoryStore::new(), "siteData");

        let result = import(&mut tracker, r#"{"activeUrl":"a.com"}"#, true);

        assert!(matches!(result, Err(SiteTimeError::InconsistentState(_))));
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn test_reset_requires_force() {
        let mut tracker = SiteTracker::new(MemoryStore::with_entry("siteData", RECORD), "siteData");

        assert!(matches!(reset(&mut tracker, false), Err(SiteTimeError::Refused(_))));
        assert!(tracker.store().get("siteData").unwrap().is_some());

        assert_eq!(reset(&mut tracker, true).unwrap(), "Removed siteData");
        assert_eq!(reset(&mut tracker, true).unwrap(), "Nothing to reset");
    }
}
