//! Error types for sitetime.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while tracking, persisting, or reporting site time.
#[derive(Error, Debug)]
pub enum SiteTimeError {
    /// `end_session` was called while no session was active.
    #[error("No active session to end")]
    NoActiveSession,

    /// A session end timestamp precedes its start.
    #[error("Negative elapsed time for {url}: session started at {started_at}, ended at {ended_at}")]
    NegativeElapsed {
        url: String,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },

    /// An empty or otherwise unusable site identifier.
    #[error("Invalid site identifier: {0:?}")]
    InvalidSite(String),

    /// Persisted state violates the active url / session start pairing.
    #[error("Inconsistent tracker state: {0}")]
    InconsistentState(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Key-value store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A destructive operation was attempted without confirmation.
    #[error("Refused: {0}")]
    Refused(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SiteTimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl SiteTimeError {
    /// Whether the error describes a caller-side misuse that left the
    /// stored state untouched. The binary exits with status 2 for these.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::NoActiveSession
                | Self::NegativeElapsed { .. }
                | Self::InvalidSite(_)
                | Self::Refused(_)
        )
    }
}
