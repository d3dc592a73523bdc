//! Command implementations for sitetime.
//!
//! Commands that touch tracking data load a `SiteTracker` over the
//! configured store, run, and return their output as a string.

mod completions;
mod data;
mod report;
mod track;

pub use completions::{completion_install_instructions, completions, generate_completions};
pub use data::{export, import, reset};
pub use report::{days, report};
pub use track::{status, track};

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::cli::args::{Commands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::SiteTimeError;
use crate::output::{format_normalized, ReportOptions};
use crate::storage::SqliteStore;
use crate::tracker::daily::active_day_key;
use crate::tracker::time::local_date;
use crate::tracker::{
    carry_over, normalize_url, record_active_day, KeyValueStore, LoadReport, SiteTracker,
    TrackerEvent,
};

const REPORT_TITLE: &str = "Time by site";

/// Execute a parsed command against the data directory in `paths`.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the command fails.
pub fn execute(
    command: Commands,
    paths: &Paths,
    config: &Config,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    match command {
        Commands::Normalize { url } => normalize(&url, format),
        Commands::Completions { shell, install } => completions(shell, install),
        other => {
            paths.ensure_dirs()?;
            let store = SqliteStore::open_at(&paths.database)?;
            if matches!(other, Commands::Days) {
                return days(&store, &config.tracking.storage_key, format);
            }
            execute_with_store(other, store, config, format, Utc::now())
        }
    }
}

/// Execute a data command against `store`, with `now` as the default event
/// time.
///
/// With daily keys, a session left open on an earlier day is carried into
/// the current day before the command runs.
///
/// # Errors
///
/// Returns an error if loading the tracker or the command fails.
pub fn execute_with_store<S: KeyValueStore>(
    command: Commands,
    store: S,
    config: &Config,
    format: OutputFormat,
    now: DateTime<Utc>,
) -> Result<String, SiteTimeError> {
    let store = &store;

    match command {
        Commands::Visit { url, at } => {
            let at = at.unwrap_or(now);
            apply_event(store, config, TrackerEvent::Navigated { url, at }, at, format)
        }
        Commands::Activate { url, at } => {
            let at = at.unwrap_or(now);
            apply_event(store, config, TrackerEvent::Activated { url, at }, at, format)
        }
        Commands::Pause { at } => {
            let at = at.unwrap_or(now);
            apply_event(store, config, TrackerEvent::FocusLost { at }, at, format)
        }
        Commands::Status => {
            let tracker = open_current(store, config, local_date(now))?;
            status(&tracker, now, format)
        }
        Commands::Report { limit, date } => {
            let tracker = match date {
                Some(date) => open_tracker(store, config, date)?,
                None => open_current(store, config, local_date(now))?,
            };
            let options = ReportOptions {
                limit: limit.or(config.report.limit),
                show_percent: config.report.show_percent,
            };
            let title = match date {
                Some(date) => format!("{REPORT_TITLE} on {}", date.format("%Y-%m-%d")),
                None => REPORT_TITLE.to_string(),
            };
            report(&tracker, &title, options, format)
        }
        Commands::Export { date } => {
            let tracker = match date {
                Some(date) => open_tracker(store, config, date)?,
                None => open_current(store, config, local_date(now))?,
            };
            export(&tracker)
        }
        Commands::Import { file, force } => {
            let text = read_import(&file)?;
            let today = local_date(now);
            let mut tracker = open_current(store, config, today)?;
            let message = import(&mut tracker, &text, force)?;
            sync_active_day(store, config, today, &tracker)?;
            Ok(message)
        }
        Commands::Reset { force } => {
            let mut tracker = open_current(store, config, local_date(now))?;
            let message = reset(&mut tracker, force)?;
            if config.tracking.daily_keys {
                store.remove(&active_day_key(&config.tracking.storage_key))?;
            }
            Ok(message)
        }
        Commands::Days => Err(SiteTimeError::Storage(
            "listing days needs the SQLite store".to_string(),
        )),
        Commands::Normalize { url } => normalize(&url, format),
        Commands::Completions { shell, install } => completions(shell, install),
    }
}

/// Execute normalize command
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn normalize(url: &str, format: OutputFormat) -> Result<String, SiteTimeError> {
    let site = normalize_url(url);
    format_normalized(url, site.as_deref(), format)
}

fn open_tracker<S: KeyValueStore>(
    store: S,
    config: &Config,
    date: NaiveDate,
) -> Result<SiteTracker<S>, SiteTimeError> {
    let key = config.tracking.storage_key_for(date);
    let (tracker, report) = SiteTracker::load(store, key)?;

    if let LoadReport::Recovered {
        backup_key: Some(backup_key),
        ..
    } = &report
    {
        warn!(key = tracker.key(), backup_key = %backup_key, "previous contents saved");
    }
    debug!(key = tracker.key(), ?report, "tracker loaded");

    Ok(tracker)
}

fn open_current<'a, S: KeyValueStore>(
    store: &'a S,
    config: &Config,
    today: NaiveDate,
) -> Result<SiteTracker<&'a S>, SiteTimeError> {
    if config.tracking.daily_keys {
        carry_over(store, &config.tracking.storage_key, today)?;
    }
    open_tracker(store, config, today)
}

fn apply_event<S: KeyValueStore>(
    store: &S,
    config: &Config,
    event: TrackerEvent,
    at: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    let day = local_date(at);
    let mut tracker = open_current(store, config, day)?;
    let output = track(&mut tracker, event, format)?;
    sync_active_day(store, config, day, &tracker)?;
    Ok(output)
}

fn sync_active_day<S: KeyValueStore>(
    store: &S,
    config: &Config,
    day: NaiveDate,
    tracker: &SiteTracker<&S>,
) -> Result<(), SiteTimeError> {
    if !config.tracking.daily_keys {
        return Ok(());
    }
    record_active_day(
        store,
        &config.tracking.storage_key,
        day,
        tracker.state().is_active(),
    )
}

fn read_import(path: &Path) -> Result<String, SiteTimeError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !path.exists() {
        return Err(SiteTimeError::NotFound(format!(
            "import file {}",
            path.display()
        )));
    }

    Ok(std::fs::read_to_string(path)?)
}
