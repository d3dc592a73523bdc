//! Active-site time tracking.
//!
//! - `state`: the session state machine (one active site at a time)
//! - `codec`: persisted text form of the state
//! - `normalize`: URL to site identifier
//! - `store`: key-value persistence boundary
//! - `service`: event handling with write-through persistence
//! - `daily`: sessions that cross local midnight under daily keys

pub mod codec;
pub mod daily;
pub mod normalize;
pub mod service;
pub mod site;
pub mod state;
pub mod store;
pub mod time;

pub use codec::{deserialize, serialize};
pub use daily::{carry_over, record_active_day, CarriedSession};
pub use normalize::normalize_url;
pub use service::{LoadReport, SiteTracker, TrackerEvent, Transition, DEFAULT_STORAGE_KEY};
pub use site::TrackedSite;
pub use state::{ActiveSession, EndedSession, TrackerState};
pub use store::{KeyValueStore, MemoryStore};
pub use time::{format_clock, format_duration, parse_instant};
