//! Storage layer for sitetime.
//!
//! Tracker snapshots live in a single `kv_store` table of a local SQLite
//! file. `SqliteStore` owns the connection and brings the schema up to date
//! when it is opened.

mod kv;
mod migrations;

pub use kv::SqliteStore;
