use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::tracker::parse_instant;
use crate::tracker::time::parse_date;

#[derive(Parser)]
#[command(name = "sitetime")]
#[command(about = "Track active time spent on websites")]
#[command(long_about = "sitetime - active time per website

Feeds browser events (navigation, tab activation, focus loss) into a
session tracker that keeps one site active at a time and accumulates
the time spent on each site. State is written through to a local
SQLite key-value store after every change.

QUICK START:
  sitetime visit https://mail.google.com/mail/u/0/   Start timing a site
  sitetime activate https://www.reddit.com/r/rust/   Switch to another tab
  sitetime pause                                     Browser lost focus
  sitetime report                                    Time spent per site

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting
  --output html      HTML table (report and status)

For more information on a specific command, run:
  sitetime <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to `general.default_output` from the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Data directory holding config.yaml and sitetime.db
    #[arg(long, env = "SITETIME_HOME", global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
    /// HTML table output.
    Html,
}

#[derive(Subcommand)]
pub enum Commands {
    /// The active tab navigated to a URL
    ///
    /// Ends the current session (if any) and starts timing the site the
    /// URL belongs to. URLs without a site (about:blank, chrome://...)
    /// only end the current session.
    ///
    /// # Examples
    ///
    ///   sitetime visit https://example.com/path?q=1
    ///   sitetime visit https://example.com --at 2025-04-01T10:00:00Z
    #[command(alias = "v")]
    Visit {
        /// Full URL of the page
        url: String,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long, value_parser = parse_instant_arg)]
        at: Option<DateTime<Utc>>,
    },

    /// A different tab or window became active
    #[command(alias = "a")]
    Activate {
        /// Full URL of the newly active tab
        url: String,
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long, value_parser = parse_instant_arg)]
        at: Option<DateTime<Utc>>,
    },

    /// All browser windows lost focus
    ///
    /// Ends the active session. Fails if nothing is being tracked.
    #[command(alias = "p")]
    Pause {
        /// Event time (RFC 3339 or epoch milliseconds); defaults to now
        #[arg(long, value_parser = parse_instant_arg)]
        at: Option<DateTime<Utc>>,
    },

    /// Show the active session
    #[command(alias = "s")]
    Status,

    /// Show time spent per site, longest first
    ///
    /// # Examples
    ///
    ///   sitetime report
    ///   sitetime report --limit 10
    ///   sitetime report --date 2025-04-01 -o html > today.html
    #[command(alias = "r")]
    Report {
        /// Show at most N sites
        #[arg(short, long)]
        limit: Option<usize>,
        /// Day to report on when daily keys are enabled
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// List the days that have a stored record
    ///
    /// Only records written with `tracking.daily_keys` enabled are listed.
    Days,

    /// Print the stored record
    Export {
        /// Day to export when daily keys are enabled
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Replace the stored record with the contents of a file
    ///
    /// The file is validated before anything is written. Use `-` to read
    /// from stdin.
    Import {
        /// File containing a serialized record
        file: PathBuf,
        /// Overwrite existing data
        #[arg(short, long)]
        force: bool,
    },

    /// Delete all tracked data
    Reset {
        /// Required confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show the site identifier a URL is tracked under
    Normalize {
        /// Full URL
        url: String,
    },

    /// Generate shell completions
    ///
    /// # Examples
    ///
    ///   sitetime completions zsh > ~/.zsh/completions/_sitetime
    ///   sitetime completions bash --install
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Print installation instructions instead of the script
        #[arg(long)]
        install: bool,
    },
}

fn parse_instant_arg(input: &str) -> Result<DateTime<Utc>, String> {
    parse_instant(input).map_err(|e| e.to_string())
}

fn parse_date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cli_visit_command() {
        let cli = Cli::try_parse_from(["sitetime", "visit", "https://a.com/"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Visit { ref url, at: None } if url == "https://a.com/"
        ));
        assert_eq!(cli.output, None);
    }

    #[test]
    fn test_cli_visit_with_timestamp() {
        let cli = Cli::try_parse_from([
            "sitetime",
            "visit",
            "https://a.com/",
            "--at",
            "2025-04-01T12:00:00+02:00",
        ])
        .unwrap();

        let expected = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
        assert!(matches!(cli.command, Commands::Visit { at: Some(at), .. } if at == expected));
    }

    #[test]
    fn test_cli_epoch_millis_timestamp() {
        let cli = Cli::try_parse_from(["sitetime", "pause", "--at", "1743501600000"]).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();
        assert!(matches!(cli.command, Commands::Pause { at: Some(at) } if at == expected));
    }

    #[test]
    fn test_cli_rejects_bad_timestamp() {
        assert!(Cli::try_parse_from(["sitetime", "pause", "--at", "yesterday"]).is_err());
    }

    #[test]
    fn test_cli_aliases() {
        let cli = Cli::try_parse_from(["sitetime", "a", "https://b.com"]).unwrap();
        assert!(matches!(cli.command, Commands::Activate { .. }));

        let cli = Cli::try_parse_from(["sitetime", "s"]).unwrap();
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_cli_report_options() {
        let cli = Cli::try_parse_from([
            "sitetime", "report", "--limit", "5", "--date", "2025-04-01", "-o", "html",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(OutputFormat::Html));
        assert!(matches!(
            cli.command,
            Commands::Report { limit: Some(5), date: Some(d) }
                if d == NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        ));
    }

    #[test]
    fn test_cli_global_output_after_subcommand() {
        let cli = Cli::try_parse_from(["sitetime", "status", "--output", "json"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_home_flag() {
        let cli = Cli::try_parse_from(["sitetime", "--home", "/tmp/st", "status"]).unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/st")));
    }

    #[test]
    fn test_cli_completions_shell() {
        let cli = Cli::try_parse_from(["sitetime", "completions", "zsh"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Zsh, install: false }
        ));
    }

    #[test]
    fn test_cli_import_and_reset_flags() {
        let cli = Cli::try_parse_from(["sitetime", "import", "state.json", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Import { force: true, .. }));

        let cli = Cli::try_parse_from(["sitetime", "reset"]).unwrap();
        assert!(matches!(cli.command, Commands::Reset { force: false }));
    }

    #[test]
    fn test_cli_days_command() {
        let cli = Cli::try_parse_from(["sitetime", "days", "-o", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Days));
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }
}
