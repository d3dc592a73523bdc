//! Per-site accumulated time.

use serde::{Deserialize, Serialize};

use super::time::minutes_from_millis;

/// A site and the active time accumulated on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSite {
    /// Normalized site identifier (unique within a tracker).
    pub url: String,
    /// Accumulated active time in milliseconds.
    pub total_time: u64,
}

impl TrackedSite {
    /// Create a site with no accumulated time.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_time(url, 0)
    }

    /// Create a site with an existing total.
    #[must_use]
    pub fn with_time(url: impl Into<String>, total_time: u64) -> Self {
        Self {
            url: url.into(),
            total_time,
        }
    }

    /// Add a session's elapsed time to the total.
    pub(crate) fn add_elapsed(&mut self, elapsed_ms: u64) {
        self.total_time = self.total_time.saturating_add(elapsed_ms);
    }

    /// Total time in fractional minutes.
    #[must_use]
    pub fn total_minutes(&self) -> f64 {
        minutes_from_millis(self.total_time)
    }
}
