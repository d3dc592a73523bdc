//! Output formatting for sitetime.
//!
//! This module renders the tracked site list, the active session, and event
//! results in pretty, JSON, or HTML form.

mod html;
mod json;
mod pretty;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::error::SiteTimeError;
use crate::tracker::{format_duration, TrackedSite, TrackerState, Transition};

pub use html::*;
pub use json::*;
pub use pretty::*;

/// Options controlling the site report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Show at most this many rows.
    pub limit: Option<usize>,
    /// Include each site's share of the total.
    pub show_percent: bool,
}

/// One row of the site report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRow {
    pub rank: usize,
    pub url: String,
    pub total_time: u64,
    pub minutes: f64,
    pub formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

/// One stored day in the daily listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub sites: usize,
    pub total_time: u64,
    pub formatted: String,
    pub active_url: Option<String>,
}

impl DaySummary {
    #[must_use]
    pub fn new(date: NaiveDate, state: &TrackerState) -> Self {
        let total_time = state.total_tracked();
        Self {
            date,
            sites: state.sites().len(),
            total_time,
            formatted: format_duration(total_time),
            active_url: state.active_url().map(str::to_string),
        }
    }
}

/// Build report rows, longest total first.
///
/// Ties are broken by url so the order is stable. Percentages are taken
/// against the total of all sites, not only the rows shown.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_rows(sites: &[TrackedSite], options: ReportOptions) -> Vec<SiteRow> {
    let grand_total = sites
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.total_time));

    let mut sorted: Vec<&TrackedSite> = sites.iter().collect();
    sorted.sort_by(|a, b| b.total_time.cmp(&a.total_time).then_with(|| a.url.cmp(&b.url)));

    let limit = options.limit.unwrap_or(sorted.len());

    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, site)| SiteRow {
            rank: i + 1,
            url: site.url.clone(),
            total_time: site.total_time,
            minutes: site.total_minutes(),
            formatted: format_duration(site.total_time),
            percent: options.show_percent.then(|| {
                if grand_total == 0 {
                    0.0
                } else {
                    site.total_time as f64 * 100.0 / grand_total as f64
                }
            }),
        })
        .collect()
}

/// Format the site report based on output format
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_report(
    state: &TrackerState,
    title: &str,
    options: ReportOptions,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    let rows = build_rows(state.sites(), options);
    let total = state.total_tracked();

    match format {
        OutputFormat::Pretty => Ok(format_report_pretty(&rows, title, total, state.active_url())),
        OutputFormat::Json => format_report_json(&rows, title, total, state.active_url()),
        OutputFormat::Html => Ok(format_report_html(&rows, title, total)),
    }
}

/// Format the list of stored days
///
/// HTML has no day view and falls back to pretty output.
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_days(days: &[DaySummary], format: OutputFormat) -> Result<String, SiteTimeError> {
    match format {
        OutputFormat::Pretty | OutputFormat::Html => Ok(format_days_pretty(days)),
        OutputFormat::Json => format_days_json(days),
    }
}

/// Format the active session based on output format
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_status(
    state: &TrackerState,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    match format {
        OutputFormat::Pretty => Ok(format_status_pretty(state, now)),
        OutputFormat::Json => format_status_json(state, now),
        OutputFormat::Html => Ok(format_status_html(state, now)),
    }
}

/// Format the result of a tracking event
///
/// HTML has no event view and falls back to pretty output.
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_transition(
    transition: &Transition,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    match format {
        OutputFormat::Pretty | OutputFormat::Html => Ok(format_transition_pretty(transition)),
        OutputFormat::Json => format_transition_json(transition),
    }
}

/// Format a normalization result
///
/// # Errors
///
/// Returns `SiteTimeError::Parse` if JSON serialization fails.
pub fn format_normalized(
    input: &str,
    site: Option<&str>,
    format: OutputFormat,
) -> Result<String, SiteTimeError> {
    match format {
        OutputFormat::Pretty | OutputFormat::Html => Ok(format_normalized_pretty(input, site)),
        OutputFormat::Json => format_normalized_json(input, site),
    }
}
