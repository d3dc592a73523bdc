use chrono::{DateTime, Utc};
use colored::Colorize;

use super::{DaySummary, SiteRow};
use crate::tracker::{format_clock, format_duration, TrackerState, Transition};

/// Format the site report as a pretty table
pub fn format_report_pretty(
    rows: &[SiteRow],
    title: &str,
    total: u64,
    active_url: Option<&str>,
) -> String {
    if rows.is_empty() {
        return format!("{title} (0 sites)\n  No sites tracked yet");
    }

    let url_width = rows
        .iter()
        .map(|r| r.url.chars().count())
        .max()
        .unwrap_or(0)
        .max("Site Name".len());

    let mut lines = Vec::new();
    lines.push(format!("{} ({} sites)", title.bold(), rows.len()));
    lines.push("─".repeat(60));
    lines.push(
        format!(
            "{:>3}  {:<url_width$}  {:>14}",
            "#", "Site Name", "Time Spent"
        )
        .dimmed()
        .to_string(),
    );

    for row in rows {
        let marker = if active_url == Some(row.url.as_str()) {
            " ●".green().to_string()
        } else {
            String::new()
        };

        let mut line = format!(
            "{:>3}  {:<url_width$}  {:>14}",
            row.rank,
            row.url,
            row.formatted.cyan()
        );
        if let Some(percent) = row.percent {
            line.push_str(&format!("  {:>5.1}%", percent).dimmed().to_string());
        }
        line.push_str(&marker);
        lines.push(line);
    }

    lines.push("─".repeat(60));
    lines.push(format!(
        "{} {}",
        "Total:".bold(),
        format_duration(total).cyan()
    ));

    lines.join("\n")
}

/// Format the stored days, oldest first
pub fn format_days_pretty(days: &[DaySummary]) -> String {
    if days.is_empty() {
        return "Days (0)\n  No daily records stored".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!("{} ({})", "Days".bold(), days.len()));
    lines.push("─".repeat(60));
    lines.push(
        format!("{:<10}  {:>5}  {:>14}", "Date", "Sites", "Time Spent")
            .dimmed()
            .to_string(),
    );

    for day in days {
        let mut line = format!(
            "{:<10}  {:>5}  {:>14}",
            day.date.format("%Y-%m-%d"),
            day.sites,
            day.formatted.cyan()
        );
        if let Some(url) = &day.active_url {
            line.push_str(&format!("  {} {url}", "●".green()));
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Format the active session
pub fn format_status_pretty(state: &TrackerState, now: DateTime<Utc>) -> String {
    let Some(active) = state.active() else {
        return format!(
            "{} Not tracking ({} sites recorded)",
            "○".dimmed(),
            state.sites().len()
        );
    };

    let live = state.live_elapsed(now).unwrap_or(0);
    let mut lines = Vec::new();
    lines.push(format!("{} Tracking {}", "●".green(), active.url.bold()));
    lines.push(format!(
        "  {}: {}",
        "Started".dimmed(),
        active.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!("  {}: {}", "Elapsed".dimmed(), format_clock(live)));
    lines.push(format!(
        "  {}: {}",
        "Recorded".dimmed(),
        format_duration(state.total_time(&active.url))
    ));

    lines.join("\n")
}

/// Format what a tracking event changed
pub fn format_transition_pretty(transition: &Transition) -> String {
    if transition.is_noop() {
        return format!("{} Nothing to track", "○".dimmed());
    }

    let mut lines = Vec::new();
    if let Some(ended) = &transition.ended {
        lines.push(format!(
            "{} Ended {} after {} (total {})",
            "■".yellow(),
            ended.url.bold(),
            format_clock(ended.elapsed_ms),
            format_duration(ended.total_time)
        ));
    }
    if let Some(started) = &transition.started {
        lines.push(format!("{} Tracking {}", "●".green(), started.bold()));
    }

    lines.join("\n")
}

/// Format a normalization result
pub fn format_normalized_pretty(input: &str, site: Option<&str>) -> String {
    match site {
        Some(site) => site.to_string(),
        None => format!("{} no site identifier for {input}", "✗".red()),
    }
}
