//! Key-value persistence boundary.
//!
//! The tracker only ever hands serialized snapshots to a store; it never
//! shares live state with it.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::SiteTimeError;

/// Opaque string key-value storage.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put(&self, key: &str, value: &str) -> Result<(), SiteTimeError>;

    /// Fetch the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, key: &str) -> Result<Option<String>, SiteTimeError>;

    /// Remove `key`. Returns true if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    fn remove(&self, key: &str) -> Result<bool, SiteTimeError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn put(&self, key: &str, value: &str) -> Result<(), SiteTimeError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>, SiteTimeError> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<bool, SiteTimeError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn put(&self, key: &str, value: &str) -> Result<(), SiteTimeError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>, SiteTimeError> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<bool, SiteTimeError> {
        (**self).remove(key)
    }
}

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&self, key: &str, value: &str) -> Result<(), SiteTimeError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, SiteTimeError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<bool, SiteTimeError> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }
}
