//! Per-day records.
//!
//! With daily keys each local day has its own record under
//! `"{base}-YYYY-MM-DD"`. The day whose record holds the open session is
//! remembered under `"{base}.active"`. When an event arrives on a later
//! day, the open session is closed at local midnight in its own record and
//! resumed at midnight in every following day up to the event's day, so a
//! session that crosses midnight is split between days.

use chrono::NaiveDate;
use tracing::{info, warn};

use super::service::SiteTracker;
use super::store::KeyValueStore;
use super::time::{date_key, local_midnight, parse_date};
use crate::error::SiteTimeError;

/// Key remembering which day holds the open session.
#[must_use]
pub fn active_day_key(base: &str) -> String {
    format!("{base}.active")
}

/// A session moved forward from an earlier day's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarriedSession {
    pub url: String,
    /// Day the session was started on.
    pub from: NaiveDate,
    /// Time credited to the earlier days.
    pub credited_ms: u64,
}

/// Move a session left open on an earlier day into `today`'s record.
///
/// Returns `None` when no earlier day holds an open session.
///
/// # Errors
///
/// Returns a storage error, or the state machine's error if the session
/// cannot be closed at midnight (its start lies after that midnight).
pub fn carry_over<S: KeyValueStore>(
    store: &S,
    base: &str,
    today: NaiveDate,
) -> Result<Option<CarriedSession>, SiteTimeError> {
    let marker_key = active_day_key(base);
    let Some(marker) = store.get(&marker_key)? else {
        return Ok(None);
    };

    let Ok(from) = parse_date(&marker) else {
        warn!(key = %marker_key, value = %marker, "unreadable active day marker, dropping it");
        store.remove(&marker_key)?;
        return Ok(None);
    };
    if from >= today {
        return Ok(None);
    }

    let (mut tracker, _) = SiteTracker::load(store, date_key(base, from))?;
    let Some(url) = tracker.state().active_url().map(str::to_string) else {
        store.remove(&marker_key)?;
        return Ok(None);
    };

    let mut day = from;
    let mut credited_ms = 0u64;
    while day < today {
        let Some(next) = day.succ_opt() else {
            break;
        };

        let closed = tracker.pause(local_midnight(next))?;
        credited_ms = credited_ms.saturating_add(closed.ended.map_or(0, |e| e.elapsed_ms));

        let (next_tracker, _) = SiteTracker::load(store, date_key(base, next))?;
        tracker = next_tracker;
        tracker.resume(&url, local_midnight(next))?;
        day = next;
    }

    store.put(&marker_key, &today.format("%Y-%m-%d").to_string())?;
    info!(url = %url, from = %from, to = %today, credited_ms, "carried open session into a new day");

    Ok(Some(CarriedSession {
        url,
        from,
        credited_ms,
    }))
}

/// Update the marker after an event on `day` left the record `active` or idle.
///
/// # Errors
///
/// Returns a storage error.
pub fn record_active_day<S: KeyValueStore>(
    store: &S,
    base: &str,
    day: NaiveDate,
    active: bool,
) -> Result<(), SiteTimeError> {
    let marker_key = active_day_key(base);
    let day = day.format("%Y-%m-%d").to_string();

    if active {
        store.put(&marker_key, &day)
    } else {
        if store.get(&marker_key)?.as_deref() == Some(day.as_str()) {
            store.remove(&marker_key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::codec::deserialize;
    use crate::tracker::store::MemoryStore;
    use chrono::{Duration, Local, TimeZone, Utc};

    const BASE: &str = "siteData";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn stored(store: &MemoryStore, date: NaiveDate) -> crate::tracker::TrackerState {
        deserialize(&store.get(&date_key(BASE, date)).unwrap().unwrap()).unwrap()
    }

    fn open_on(store: &MemoryStore, date: NaiveDate) -> SiteTracker<&MemoryStore> {
        SiteTracker::load(store, date_key(BASE, date)).unwrap().0
    }

    #[test]
    fn test_no_marker_is_noop() {
        let store = MemoryStore::new();
        assert_eq!(carry_over(&store, BASE, day(11)).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_split_at_midnight() {
        let store = MemoryStore::new();
        let late = Local
            .with_ymd_and_hms(2025, 6, 10, 23, 50, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        open_on(&store, day(10)).switch_to("https://a.com/", late).unwrap();
        record_active_day(&store, BASE, day(10), true).unwrap();

        let carried = carry_over(&store, BASE, day(11)).unwrap().unwrap();

        assert_eq!(carried.url, "a.com");
        assert_eq!(carried.from, day(10));
        assert_eq!(carried.credited_ms, 600_000);
        assert!(!stored(&store, day(10)).is_active());
        assert_eq!(stored(&store, day(10)).total_time("a.com"), 600_000);
        assert_eq!(stored(&store, day(11)).active_url(), Some("a.com"));
        assert_eq!(
            stored(&store, day(11)).session_start(),
            Some(local_midnight(day(11)))
        );
        assert_eq!(store.get(&active_day_key(BASE)).unwrap().as_deref(), Some("2025-06-11"));
    }

    #[test]
    fn test_whole_days_credited_across_gap() {
        let store = MemoryStore::new();
        let start = local_midnight(day(10)) + Duration::hours(23);
        open_on(&store, day(10)).switch_to("https://a.com/", start).unwrap();
        record_active_day(&store, BASE, day(10), true).unwrap();

        carry_over(&store, BASE, day(12)).unwrap().unwrap();

        assert_eq!(
            stored(&store, day(11)).total_time("a.com"),
            u64::try_from((local_midnight(day(12)) - local_midnight(day(11))).num_milliseconds())
                .unwrap()
        );
        assert!(!stored(&store, day(11)).is_active());
        assert_eq!(stored(&store, day(12)).active_url(), Some("a.com"));
    }

    #[test]
    fn test_idle_marker_day_clears_marker() {
        let store = MemoryStore::new();
        store.put(&active_day_key(BASE), "2025-06-10").unwrap();

        assert_eq!(carry_over(&store, BASE, day(11)).unwrap(), None);
        assert!(store.get(&active_day_key(BASE)).unwrap().is_none());
    }

    #[test]
    fn test_same_day_marker_is_left_alone() {
        let store = MemoryStore::new();
        record_active_day(&store, BASE, day(11), true).unwrap();

        assert_eq!(carry_over(&store, BASE, day(11)).unwrap(), None);
        assert_eq!(store.get(&active_day_key(BASE)).unwrap().as_deref(), Some("2025-06-11"));
    }

    #[test]
    fn test_unreadable_marker_is_dropped() {
        let store = MemoryStore::with_entry(&active_day_key(BASE), "soon");

        assert_eq!(carry_over(&store, BASE, day(11)).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_idle_only_clears_matching_day() {
        let store = MemoryStore::new();
        record_active_day(&store, BASE, day(11), true).unwrap();

        record_active_day(&store, BASE, day(10), false).unwrap();
        assert!(store.get(&active_day_key(BASE)).unwrap().is_some());

        record_active_day(&store, BASE, day(11), false).unwrap();
        assert!(store.get(&active_day_key(BASE)).unwrap().is_none());
    }
}
