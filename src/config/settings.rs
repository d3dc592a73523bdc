//! Configuration settings for sitetime.
//!
//! Settings are loaded from `~/.sitetime/config.yaml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::error::SiteTimeError;
use crate::tracker::time::date_key;
use crate::tracker::DEFAULT_STORAGE_KEY;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Where and how tracker state is stored.
    pub tracking: TrackingConfig,
    /// Report rendering settings.
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Key the tracker state is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Keep one record per local day (`{storage_key}-YYYY-MM-DD`).
    #[serde(default)]
    pub daily_keys: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Show at most this many sites.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Add a share-of-total column.
    #[serde(default = "default_true")]
    pub show_percent: bool,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            daily_keys: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            limit: None,
            show_percent: default_true(),
        }
    }
}

impl TrackingConfig {
    /// Storage key for the record covering `date`.
    ///
    /// Without daily keys every date shares the base key.
    #[must_use]
    pub fn storage_key_for(&self, date: NaiveDate) -> String {
        if self.daily_keys {
            date_key(&self.storage_key, date)
        } else {
            self.storage_key.clone()
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if it names an empty storage key.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, SiteTimeError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            SiteTimeError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            SiteTimeError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        if config.tracking.storage_key.trim().is_empty() {
            return Err(SiteTimeError::Config(format!(
                "tracking.storage_key must not be empty in {}",
                path.display()
            )));
        }

        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), SiteTimeError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| SiteTimeError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            SiteTimeError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }
}
