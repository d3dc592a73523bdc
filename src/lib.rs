//! sitetime - active time tracking per website
//!
//! The core is a session state machine ([`tracker::TrackerState`]) that
//! times one site at a time and accumulates per-site totals, a URL
//! normalizer that maps pages to sites, and a key-value persistence
//! boundary. [`tracker::SiteTracker`] ties them together and writes the
//! state through to storage after every change.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod storage;
pub mod tracker;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::SiteTimeError;
pub use tracker::{SiteTracker, TrackerEvent, TrackerState};
