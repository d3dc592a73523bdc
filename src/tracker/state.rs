//! The active-session state machine.
//!
//! A tracker is either idle or timing exactly one site. Starting a session
//! while another is active closes the old one first, so accumulated time is
//! never dropped. Both transitions leave the state untouched when they fail.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::site::TrackedSite;
use super::time::{elapsed_millis, truncate_to_millis};
use crate::error::SiteTimeError;

/// The site currently being timed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub url: String,
    pub started_at: DateTime<Utc>,
}

/// A session that was just closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndedSession {
    pub url: String,
    /// Time added to the site by this session.
    pub elapsed_ms: u64,
    /// The site's total after the session was recorded.
    pub total_time: u64,
}

/// In-memory tracking state.
///
/// The active url and session start live together in one `Option`, so one
/// can never be present without the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    active: Option<ActiveSession>,
    sites: Vec<TrackedSite>,
}

impl TrackerState {
    /// Create an idle tracker with no sites.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a state from already-validated parts.
    pub(crate) fn from_parts(active: Option<ActiveSession>, sites: Vec<TrackedSite>) -> Self {
        Self { active, sites }
    }

    /// Start timing `url` at `now`.
    ///
    /// If a session is already active it is ended at `now` first and returned.
    /// The site is registered with a zero total if it is new.
    ///
    /// # Errors
    ///
    /// Returns `SiteTimeError::InvalidSite` for an empty url, or the error from
    /// closing the previous session (e.g. `NegativeElapsed`). The state is left
    /// unchanged in both cases.
    pub fn start_session(
        &mut self,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<EndedSession>, SiteTimeError> {
        if url.trim().is_empty() {
            return Err(SiteTimeError::InvalidSite(url.to_string()));
        }

        let now = truncate_to_millis(now);
        let ended = if self.active.is_some() {
            Some(self.end_session(now)?)
        } else {
            None
        };

        if self.ensure_site(url) {
            debug!(url, "registered new site");
        }
        self.active = Some(ActiveSession {
            url: url.to_string(),
            started_at: now,
        });
        debug!(url, started_at = %now, "session started");

        Ok(ended)
    }

    /// End the active session at `now`, adding its elapsed time to the site.
    ///
    /// # Errors
    ///
    /// Returns `SiteTimeError::NoActiveSession` when idle, and
    /// `SiteTimeError::NegativeElapsed` when `now` precedes the session start.
    /// The state is left unchanged in both cases.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> Result<EndedSession, SiteTimeError> {
        let now = truncate_to_millis(now);

        let elapsed_ms = match &self.active {
            None => return Err(SiteTimeError::NoActiveSession),
            Some(active) => u64::try_from(elapsed_millis(active.started_at, now)).map_err(|_| {
                SiteTimeError::NegativeElapsed {
                    url: active.url.clone(),
                    started_at: active.started_at,
                    ended_at: now,
                }
            })?,
        };

        let Some(active) = self.active.take() else {
            return Err(SiteTimeError::NoActiveSession);
        };

        let total_time = if let Some(site) = self.sites.iter_mut().find(|s| s.url == active.url) {
            site.add_elapsed(elapsed_ms);
            site.total_time
        } else {
            // Active url was never registered; keep the time rather than lose it.
            debug!(url = %active.url, "active site missing from list, appending");
            self.sites.push(TrackedSite::with_time(&active.url, elapsed_ms));
            elapsed_ms
        };

        debug!(url = %active.url, elapsed_ms, total_time, "session ended");

        Ok(EndedSession {
            url: active.url,
            elapsed_ms,
            total_time,
        })
    }

    /// All tracked sites, in registration order.
    #[must_use]
    pub fn sites(&self) -> &[TrackedSite] {
        &self.sites
    }

    /// The active session, if any.
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn active_url(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.url.as_str())
    }

    #[must_use]
    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|a| a.started_at)
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Look up a site by identifier.
    #[must_use]
    pub fn site(&self, url: &str) -> Option<&TrackedSite> {
        self.sites.iter().find(|s| s.url == url)
    }

    /// Accumulated time for `url`, zero if unknown.
    #[must_use]
    pub fn total_time(&self, url: &str) -> u64 {
        self.site(url).map_or(0, |s| s.total_time)
    }

    /// Sum of all accumulated time.
    #[must_use]
    pub fn total_tracked(&self) -> u64 {
        self.sites
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.total_time))
    }

    /// Time elapsed in the active session as of `now` (not yet recorded).
    ///
    /// Returns `None` when idle. A `now` before the session start reads as zero.
    #[must_use]
    pub fn live_elapsed(&self, now: DateTime<Utc>) -> Option<u64> {
        self.active
            .as_ref()
            .map(|a| u64::try_from(elapsed_millis(a.started_at, now)).unwrap_or(0))
    }

    /// Drop all sites and any active session.
    pub fn clear(&mut self) {
        self.active = None;
        self.sites.clear();
    }

    /// Register `url` if absent. Returns true if it was appended.
    fn ensure_site(&mut self, url: &str) -> bool {
        if self.sites.iter().any(|s| s.url == url) {
            return false;
        }
        self.sites.push(TrackedSite::new(url));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap()
    }

    fn ms(n: i64) -> Duration {
        Duration::milliseconds(n)
    }

    fn assert_paired(state: &TrackerState) {
        assert_eq!(state.active_url().is_some(), state.session_start().is_some());
    }

    fn assert_unique(state: &TrackerState) {
        let urls: HashSet<&str> = state.sites().iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls.len(), state.sites().len());
    }

    #[test]
    fn test_start_then_end_records_time() {
        let mut state = TrackerState::new();

        state.start_session("example.com", t0()).unwrap();
        let ended = state.end_session(t0() + ms(600_000)).unwrap();

        assert_eq!(ended.url, "example.com");
        assert_eq!(ended.elapsed_ms, 600_000);
        assert_eq!(state.sites(), &[TrackedSite::with_time("example.com", 600_000)]);
        assert!(state.active_url().is_none());
        assert!(state.session_start().is_none());
    }

    #[test]
    fn test_switch_without_end_closes_previous_session() {
        let mut state = TrackerState::new();

        state.start_session("a.com", t0()).unwrap();
        let ended = state.start_session("b.com", t0() + ms(60_000)).unwrap();

        assert_eq!(ended.map(|e| e.elapsed_ms), Some(60_000));
        assert_eq!(state.total_time("a.com"), 60_000);
        assert_eq!(state.active_url(), Some("b.com"));
        assert_eq!(state.session_start(), Some(t0() + ms(60_000)));
        assert_eq!(state.total_time("b.com"), 0);
    }

    #[test]
    fn test_end_while_idle_reports_error_and_keeps_state() {
        let mut state = TrackerState::new();

        let result = state.end_session(t0());

        assert!(matches!(result, Err(SiteTimeError::NoActiveSession)));
        assert_eq!(state, TrackerState::new());
    }

    #[test]
    fn test_negative_elapsed_is_rejected() {
        let mut state = TrackerState::new();
        state.start_session("a.com", t0()).unwrap();
        let before = state.clone();

        let result = state.end_session(t0() - ms(1));

        assert!(matches!(result, Err(SiteTimeError::NegativeElapsed { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_switch_with_negative_elapsed_leaves_state_unchanged() {
        let mut state = TrackerState::new();
        state.start_session("a.com", t0()).unwrap();
        let before = state.clone();

        let result = state.start_session("b.com", t0() - ms(5_000));

        assert!(matches!(result, Err(SiteTimeError::NegativeElapsed { .. })));
        assert_eq!(state, before);
        assert!(state.site("b.com").is_none());
    }

    #[test]
    fn test_empty_url_is_rejected() {
        let mut state = TrackerState::new();

        assert!(matches!(
            state.start_session("  ", t0()),
            Err(SiteTimeError::InvalidSite(_))
        ));
        assert!(state.sites().is_empty());
        assert!(!state.is_active());
    }

    #[test]
    fn test_restart_same_site_accumulates() {
        let mut state = TrackerState::new();

        state.start_session("a.com", t0()).unwrap();
        state.start_session("a.com", t0() + ms(1_000)).unwrap();
        state.end_session(t0() + ms(3_000)).unwrap();

        assert_eq!(state.sites().len(), 1);
        assert_eq!(state.total_time("a.com"), 3_000);
    }

    #[test]
    fn test_end_appends_unregistered_active_site() {
        let active = ActiveSession {
            url: "ghost.com".to_string(),
            started_at: t0(),
        };
        let mut state = TrackerState::from_parts(Some(active), Vec::new());

        let ended = state.end_session(t0() + ms(2_500)).unwrap();

        assert_eq!(ended.total_time, 2_500);
        assert_eq!(state.sites(), &[TrackedSite::with_time("ghost.com", 2_500)]);
    }

    #[test]
    fn test_zero_length_session() {
        let mut state = TrackerState::new();
        state.start_session("a.com", t0()).unwrap();

        let ended = state.end_session(t0()).unwrap();

        assert_eq!(ended.elapsed_ms, 0);
        assert_eq!(state.total_time("a.com"), 0);
    }

    #[test]
    fn test_sub_millisecond_inputs_are_truncated() {
        let mut state = TrackerState::new();
        let start = t0() + Duration::nanoseconds(999_999);

        state.start_session("a.com", start).unwrap();

        assert_eq!(state.session_start(), Some(t0()));
    }

    #[test]
    fn test_get_sites_is_idempotent() {
        let mut state = TrackerState::new();
        state.start_session("a.com", t0()).unwrap();
        state.start_session("b.com", t0() + ms(10)).unwrap();

        let first = state.sites().to_vec();
        let second = state.sites().to_vec();

        assert_eq!(first, second);
    }

    #[test]
    fn test_live_elapsed() {
        let mut state = TrackerState::new();
        assert_eq!(state.live_elapsed(t0()), None);

        state.start_session("a.com", t0()).unwrap();
        assert_eq!(state.live_elapsed(t0() + ms(42)), Some(42));
        assert_eq!(state.live_elapsed(t0() - ms(42)), Some(0));
    }

    #[test]
    fn test_total_tracked_and_clear() {
        let mut state = TrackerState::new();
        state.start_session("a.com", t0()).unwrap();
        state.start_session("b.com", t0() + ms(100)).unwrap();
        state.end_session(t0() + ms(300)).unwrap();

        assert_eq!(state.total_tracked(), 300);

        state.clear();
        assert_eq!(state, TrackerState::new());
    }

    #[test]
    fn test_invariants_hold_over_event_sequence() {
        let urls = ["a.com", "b.com", "c.com", "mail.google.com"];
        let mut state = TrackerState::new();
        let mut now = t0();
        let mut previous: Vec<TrackedSite> = Vec::new();
        let mut seed: u64 = 0x5EED;

        for _ in 0..500 {
            // xorshift keeps the sequence deterministic
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;

            now += ms(i64::try_from(seed % 90_000).unwrap());
            let roll = seed % 10;

            if roll < 7 {
                let url = urls[usize::try_from(seed % 4).unwrap()];
                state.start_session(url, now).unwrap();
            } else {
                let was_active = state.is_active();
                let result = state.end_session(now);
                assert_eq!(result.is_ok(), was_active);
            }

            assert_paired(&state);
            assert_unique(&state);
            for old in &previous {
                assert!(state.total_time(&old.url) >= old.total_time);
            }
            previous = state.sites().to_vec();
        }
    }
}
