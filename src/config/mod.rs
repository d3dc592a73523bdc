//! Configuration management for sitetime.
//!
//! This module handles loading and saving configuration from `~/.sitetime/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{ColorSetting, Config, GeneralConfig, ReportConfig, TrackingConfig};
