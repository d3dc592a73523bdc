//! Tracker service: applies host events to the state and persists it.
//!
//! `SiteTracker` is the single owner of a `TrackerState`. Every successful
//! mutation is written through to the store. A failed write is reported to
//! the caller but the in-memory state keeps the mutation, so the next
//! successful write catches storage up.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::codec::{deserialize, serialize};
use super::normalize::normalize_url;
use super::site::TrackedSite;
use super::state::{EndedSession, TrackerState};
use super::store::KeyValueStore;
use crate::error::SiteTimeError;

/// Storage key used by the browser extension.
pub const DEFAULT_STORAGE_KEY: &str = "siteData";

/// An event delivered by the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The active tab navigated to `url`.
    Navigated { url: String, at: DateTime<Utc> },
    /// A different tab or window became active, showing `url`.
    Activated { url: String, at: DateTime<Utc> },
    /// All browser windows lost focus.
    FocusLost { at: DateTime<Utc> },
}

impl TrackerEvent {
    /// When the event happened.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Navigated { at, .. } | Self::Activated { at, .. } | Self::FocusLost { at } => *at,
        }
    }
}

/// What an event changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Session closed by the event.
    pub ended: Option<EndedSession>,
    /// Site whose session was opened by the event.
    pub started: Option<String>,
}

impl Transition {
    /// True if the event left the state untouched.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.ended.is_none() && self.started.is_none()
    }
}

/// Outcome of loading persisted state at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadReport {
    /// Nothing was stored under the key.
    Fresh,
    /// Stored state was restored.
    Restored { sites: usize, active: bool },
    /// Stored state was unreadable; tracking starts empty.
    Recovered {
        error: String,
        /// Key the unreadable text was copied to, if the copy succeeded.
        backup_key: Option<String>,
    },
}

/// Owns the tracking state and its persistence.
pub struct SiteTracker<S: KeyValueStore> {
    state: TrackerState,
    store: S,
    key: String,
}

impl<S: KeyValueStore> SiteTracker<S> {
    /// Create an empty tracker without touching the store.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            state: TrackerState::new(),
            store,
            key: key.into(),
        }
    }

    /// Load the tracker from `store`.
    ///
    /// Unreadable stored text is copied to `"{key}.corrupt"` and tracking
    /// starts from an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from the store fails.
    pub fn load(store: S, key: impl Into<String>) -> Result<(Self, LoadReport), SiteTimeError> {
        let mut tracker = Self::new(store, key);

        let Some(text) = tracker.store.get(&tracker.key)? else {
            debug!(key = %tracker.key, "no stored state");
            return Ok((tracker, LoadReport::Fresh));
        };

        match deserialize(&text) {
            Ok(state) => {
                let report = LoadReport::Restored {
                    sites: state.sites().len(),
                    active: state.is_active(),
                };
                debug!(key = %tracker.key, sites = state.sites().len(), "restored state");
                tracker.state = state;
                Ok((tracker, report))
            }
            Err(e) => {
                warn!(key = %tracker.key, error = %e, "stored state unreadable, starting empty");
                let backup_key = format!("{}.corrupt", tracker.key);
                let backup_key = match tracker.store.put(&backup_key, &text) {
                    Ok(()) => Some(backup_key),
                    Err(backup_err) => {
                        warn!(error = %backup_err, "failed to back up unreadable state");
                        None
                    }
                };
                Ok((
                    tracker,
                    LoadReport::Recovered {
                        error: e.to_string(),
                        backup_key,
                    },
                ))
            }
        }
    }

    /// Apply a host event.
    ///
    /// Navigation and activation switch the active site (closing any current
    /// session first). A URL without a site identifier closes the current
    /// session and starts nothing. Focus loss ends the current session.
    ///
    /// # Errors
    ///
    /// Returns the state machine's error if the transition is refused
    /// (nothing is persisted then), or a storage error if the write fails
    /// after a successful transition.
    pub fn handle(&mut self, event: TrackerEvent) -> Result<Transition, SiteTimeError> {
        match event {
            TrackerEvent::Navigated { url, at } | TrackerEvent::Activated { url, at } => {
                self.switch_to(&url, at)
            }
            TrackerEvent::FocusLost { at } => self.pause(at),
        }
    }

    /// Make the site for `raw_url` the active one.
    ///
    /// # Errors
    ///
    /// See [`SiteTracker::handle`].
    pub fn switch_to(&mut self, raw_url: &str, at: DateTime<Utc>) -> Result<Transition, SiteTimeError> {
        let Some(site) = normalize_url(raw_url) else {
            if !self.state.is_active() {
                return Ok(Transition::default());
            }
            let ended = self.state.end_session(at)?;
            self.persist()?;
            return Ok(Transition {
                ended: Some(ended),
                started: None,
            });
        };

        self.resume(&site, at)
    }

    /// Start timing an already-normalized site identifier.
    ///
    /// # Errors
    ///
    /// See [`SiteTracker::handle`].
    pub fn resume(&mut self, site: &str, at: DateTime<Utc>) -> Result<Transition, SiteTimeError> {
        let ended = self.state.start_session(site, at)?;
        self.persist()?;
        Ok(Transition {
            ended,
            started: Some(site.to_string()),
        })
    }

    /// End the active session without starting another.
    ///
    /// # Errors
    ///
    /// Returns `SiteTimeError::NoActiveSession` when idle, or a storage error
    /// if the write fails.
    pub fn pause(&mut self, at: DateTime<Utc>) -> Result<Transition, SiteTimeError> {
        let ended = self.state.end_session(at)?;
        self.persist()?;
        Ok(Transition {
            ended: Some(ended),
            started: None,
        })
    }

    /// Write the current state to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the store write fails.
    pub fn persist(&self) -> Result<(), SiteTimeError> {
        let text = serialize(&self.state)?;
        self.store.put(&self.key, &text).map_err(|e| {
            warn!(key = %self.key, error = %e, "failed to persist tracker state");
            e
        })
    }

    /// Replace the whole state (e.g. from an import) and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn replace_state(&mut self, state: TrackerState) -> Result<(), SiteTimeError> {
        self.state = state;
        self.persist()
    }

    /// Drop all tracked data and remove the stored record.
    ///
    /// Returns true if a stored record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store removal fails.
    pub fn reset(&mut self) -> Result<bool, SiteTimeError> {
        self.state.clear();
        let removed = self.store.remove(&self.key)?;
        info!(key = %self.key, removed, "tracking data reset");
        Ok(removed)
    }

    #[must_use]
    pub const fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn sites(&self) -> &[TrackedSite] {
        self.state.sites()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store, dropping the in-memory state.
    pub fn into_store(self) -> S {
        self.store
    }
}
