//! Report commands.

use tracing::warn;

use crate::cli::args::OutputFormat;
use crate::error::SiteTimeError;
use crate::output::{format_days, format_report, DaySummary, ReportOptions};
use crate::storage::SqliteStore;
use crate::tracker::time::parse_date_key;
use crate::tracker::{deserialize, KeyValueStore, SiteTracker};

/// Execute report command
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn report<S: KeyValueStore>(
    tracker: &SiteTracker<S>,
    title: &str,
    options: ReportOptions,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    format_report(tracker.state(), title, options, format)
}

/// Execute days command: summarize every per-day record under `base`.
///
/// Unreadable records are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the store cannot be read or output formatting fails.
pub fn days(store: &SqliteStore, base: &str, format: OutputFormat) -> Result<String, SiteTimeError> {
    let mut summaries = Vec::new();

    for key in store.keys(&format!("{base}-"))? {
        let Some(date) = parse_date_key(base, &key) else {
            continue;
        };
        let Some(text) = store.get(&key)? else {
            continue;
        };
        match deserialize(&text) {
            Ok(state) => summaries.push(DaySummary::new(date, &state)),
            Err(e) => warn!(key = %key, error = %e, "skipping unreadable day record"),
        }
    }

    format_days(&summaries, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_report_after_events() {
        let t0 = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
        let mut tracker = SiteTracker::new(MemoryStore::new(), "siteData");
        tracker.switch_to("https://www.reddit.com/r/linux/", t0).unwrap();
        tracker
            .switch_to("https://mail.google.com/mail/u/0/#inbox", t0 + Duration::minutes(10))
            .unwrap();
        tracker.pause(t0 + Duration::minutes(40)).unwrap();

        let output = report(
            &tracker,
            "Time by site",
            ReportOptions::default(),
            OutputFormat::Html,
        )
        .unwrap();

        assert!(output.contains("<tr><td>1</td><td>mail.google.com</td><td>30 min</td></tr>"));
        assert!(output.contains("<tr><td>2</td><td>www.reddit.com</td><td>10 min</td></tr>"));
    }

    #[test]
    fn test_days_lists_daily_records_only() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .put("siteData-2025-06-11", r#"{"sites":[{"url":"a.com","totalTime":60000}]}"#)
            .unwrap();
        store
            .put("siteData-2025-06-10", r#"{"sites":[{"url":"a.com","totalTime":600000}]}"#)
            .unwrap();
        store.put("siteData-2025-06-12", "garbage").unwrap();
        store.put("siteData-2025-06-09.corrupt", "garbage").unwrap();
        store.put("siteData.active", "2025-06-11").unwrap();
        store.put("siteData", r#"{"sites":[]}"#).unwrap();
        store.put("siteData-x-2025-06-10", r#"{"sites":[]}"#).unwrap();

        let output = days(&store, "siteData", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["count"], 2);
        assert_eq!(value["days"][0]["date"], "2025-06-10");
        assert_eq!(value["days"][0]["totalTime"], 600_000);
        assert_eq!(value["days"][1]["date"], "2025-06-11");
    }
}
