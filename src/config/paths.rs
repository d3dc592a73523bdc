//! Path resolution for sitetime configuration and data files.
//!
//! All sitetime data is stored in `~/.sitetime/`:
//! - `config.yaml` - Main configuration file
//! - `sitetime.db` - SQLite key-value store holding tracker snapshots

use std::path::PathBuf;

use crate::error::SiteTimeError;

/// Paths to sitetime configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.sitetime/`
    pub root: PathBuf,
    /// Config file: `~/.sitetime/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.sitetime/sitetime.db`
    pub database: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SiteTimeError> {
        let home = std::env::var("HOME").map_err(|_| {
            SiteTimeError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".sitetime")))
    }

    /// Create paths with a custom root directory.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("sitetime.db"),
            root,
        }
    }

    /// Ensure the root directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), SiteTimeError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                SiteTimeError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_root(PathBuf::from(".sitetime")))
    }
}
