//! `SQLite`-backed key-value store.
//!
//! Each key holds one text value; writes replace the previous value.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::debug;

use super::migrations;
use crate::error::SiteTimeError;
use crate::tracker::store::KeyValueStore;
use crate::tracker::time::to_iso;

/// Key-value store persisted in a local `SQLite` file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path` and migrate its schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, SiteTimeError> {
        let conn = Connection::open(path).map_err(|e| {
            SiteTimeError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "opened site store");
        Self::with_connection(conn)
    }

    /// Open a store that lives only as long as the value.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migrations fail.
    pub fn open_in_memory() -> Result<Self, SiteTimeError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            SiteTimeError::Database(format!("Failed to open in-memory database: {e}"))
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, SiteTimeError> {
        // Answers "memory" for in-memory databases.
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
            .map_err(|e| SiteTimeError::Database(format!("Failed to set journal mode: {e}")))?;
        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    /// List stored keys starting with `prefix`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn keys(&self, prefix: &str) -> Result<Vec<String>, SiteTimeError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_store WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")
            .map_err(|e| SiteTimeError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([prefix], |row| row.get::<_, String>(0))
            .map_err(|e| SiteTimeError::Database(format!("Failed to query keys: {e}")))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(|e| SiteTimeError::Database(e.to_string()))?);
        }

        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn put(&self, key: &str, value: &str) -> Result<(), SiteTimeError> {
        self.conn
            .execute(
                r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, to_iso(Utc::now())],
            )
            .map_err(|e| SiteTimeError::Storage(format!("Failed to store {key}: {e}")))?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, SiteTimeError> {
        let result = self.conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SiteTimeError::Storage(format!("Failed to read {key}: {e}"))),
        }
    }

    fn remove(&self, key: &str) -> Result<bool, SiteTimeError> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map_err(|e| SiteTimeError::Storage(format!("Failed to remove {key}: {e}")))?;

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{SiteTracker, TrackerEvent};
    use chrono::{Duration, TimeZone};

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_open_runs_migrations() {
        let store = create_test_store();
        assert_eq!(migrations::get_version(&store.conn).unwrap(), 1);
    }

    #[test]
    fn test_open_creates_file_and_reopens() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("sitetime.db");

        SqliteStore::open_at(&db_path).unwrap().put("siteData", "{}").unwrap();
        assert!(db_path.exists());

        let reopened = SqliteStore::open_at(&db_path).unwrap();
        assert_eq!(migrations::get_version(&reopened.conn).unwrap(), 1);
        assert_eq!(reopened.get("siteData").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_put_records_update_time() {
        let store = create_test_store();
        store.put("siteData", "{}").unwrap();

        let updated_at: String = store
            .conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = 'siteData'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert!(updated_at.ends_with('Z'));
    }

    #[test]
    fn test_put_and_get() {
        let store = create_test_store();

        assert!(store.get("siteData").unwrap().is_none());

        store.put("siteData", "{}").unwrap();
        assert_eq!(store.get("siteData").unwrap().as_deref(), Some("{}"));

        store.put("siteData", r#"{"sites":[]}"#).unwrap();
        assert_eq!(store.get("siteData").unwrap().as_deref(), Some(r#"{"sites":[]}"#));
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.put("siteData", "{}").unwrap();

        assert!(store.remove("siteData").unwrap());
        assert!(!store.remove("siteData").unwrap());
        assert!(store.get("siteData").unwrap().is_none());
    }

    #[test]
    fn test_keys_by_prefix() {
        let store = create_test_store();
        store.put("siteData-2025-04-02", "{}").unwrap();
        store.put("siteData-2025-04-01", "{}").unwrap();
        store.put("other", "{}").unwrap();

        let keys = store.keys("siteData-").unwrap();

        assert_eq!(keys, vec!["siteData-2025-04-01", "siteData-2025-04-02"]);
    }

    #[test]
    fn test_tracker_state_survives_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("sitetime.db");
        let t0 = Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap();

        {
            let store = SqliteStore::open_at(&db_path).unwrap();
            let mut tracker = SiteTracker::new(store, "siteData");
            tracker
                .handle(TrackerEvent::Navigated {
                    url: "https://example.com/".to_string(),
                    at: t0,
                })
                .unwrap();
        }

        let store = SqliteStore::open_at(&db_path).unwrap();
        let (mut tracker, _) = SiteTracker::load(store, "siteData").unwrap();
        tracker
            .handle(TrackerEvent::FocusLost {
                at: t0 + Duration::minutes(10),
            })
            .unwrap();

        assert_eq!(tracker.state().total_time("example.com"), 600_000);
    }
}
