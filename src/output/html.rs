//! HTML output for the site report.
//!
//! Produces a standalone table with `#`, Site Name, and Time Spent columns,
//! matching the popup the browser extension renders.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use super::SiteRow;
use crate::tracker::{format_clock, format_duration, TrackerState};

/// Escape text for use inside HTML element content or attribute values.
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format the site report as an HTML table
pub fn format_report_html(rows: &[SiteRow], title: &str, total: u64) -> String {
    let show_percent = rows.iter().any(|r| r.percent.is_some());

    let mut html = String::new();
    let _ = writeln!(html, "<h1>{}</h1>", html_escape(title));
    html.push_str("<table>\n  <thead>\n    <tr>");
    html.push_str("<th>#</th><th>Site Name</th><th>Time Spent</th>");
    if show_percent {
        html.push_str("<th>Share</th>");
    }
    html.push_str("</tr>\n  </thead>\n  <tbody>\n");

    for row in rows {
        let _ = write!(
            html,
            "    <tr><td>{}</td><td>{}</td><td>{}</td>",
            row.rank,
            html_escape(&row.url),
            html_escape(&row.formatted)
        );
        if let Some(percent) = row.percent {
            let _ = write!(html, "<td>{percent:.1}%</td>");
        }
        html.push_str("</tr>\n");
    }

    html.push_str("  </tbody>\n");
    let _ = writeln!(
        html,
        "  <tfoot>\n    <tr><td></td><td>Total</td><td>{}</td></tr>\n  </tfoot>",
        format_duration(total)
    );
    html.push_str("</table>");
    html
}

/// Format the active session as an HTML paragraph
pub fn format_status_html(state: &TrackerState, now: DateTime<Utc>) -> String {
    match state.active() {
        Some(active) => format!(
            "<p>Tracking <strong>{}</strong> for {}</p>",
            html_escape(&active.url),
            format_clock(state.live_elapsed(now).unwrap_or(0))
        ),
        None => "<p>Not tracking</p>".to_string(),
    }
}
