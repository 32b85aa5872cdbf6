//! Storage layer for privmask.
//!
//! This module provides `SQLite`-based persistent storage for user
//! preferences, most importantly the privacy on/off flag.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::toggle::PreferenceBackend;

/// Key-value preference store backed by `SQLite`.
#[derive(Debug)]
pub struct PreferenceStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl PreferenceStore {
    /// Open or create a preference database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening preference database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Preference database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        debug!(key, "Stored preference");
        Ok(())
    }

    /// Delete the value stored under `key`.
    ///
    /// Returns `true` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    /// Get the time `key` was last written.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored timestamp is malformed.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::internal(format!("invalid timestamp for '{key}': {e}")))
        })
        .transpose()
    }
}

impl PreferenceBackend for PreferenceStore {
    fn load_flag(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key)?.as_deref() {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(other) => Err(Error::invalid_preference(key, other)),
        }
    }

    fn store_flag(&mut self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toggle::{PrivacyToggle, PRIVACY_ENABLED_KEY};

    fn create_test_store() -> PreferenceStore {
        PreferenceStore::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        let store = create_test_store();
        assert_eq!(store.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_get_missing() {
        let store = create_test_store();
        assert_eq!(store.get("nothing").unwrap(), None);
        assert_eq!(store.updated_at("nothing").unwrap(), None);
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_set_overwrites() {
        let store = create_test_store();
        store.set("theme", "dark").unwrap();
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_updated_at_recorded() {
        let store = create_test_store();
        let before = Utc::now();
        store.set("theme", "dark").unwrap();
        let after = Utc::now();

        let stamp = store.updated_at("theme").unwrap().unwrap();
        assert!(stamp >= before && stamp <= after);
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.set("theme", "dark").unwrap();

        assert!(store.remove("theme").unwrap());
        assert!(!store.remove("theme").unwrap());
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn test_flag_roundtrip() {
        let mut store = create_test_store();
        assert_eq!(store.load_flag(PRIVACY_ENABLED_KEY).unwrap(), None);

        store.store_flag(PRIVACY_ENABLED_KEY, false).unwrap();
        assert_eq!(store.get(PRIVACY_ENABLED_KEY).unwrap().as_deref(), Some("false"));
        assert_eq!(store.load_flag(PRIVACY_ENABLED_KEY).unwrap(), Some(false));
    }

    #[test]
    fn test_invalid_flag_value() {
        let store = create_test_store();
        store.set(PRIVACY_ENABLED_KEY, "yes").unwrap();

        let err = store.load_flag(PRIVACY_ENABLED_KEY).unwrap_err();
        assert!(matches!(err, Error::InvalidPreference { .. }));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.db");

        let store = PreferenceStore::open(&path).unwrap();
        assert_eq!(store.path(), path);
        assert!(path.exists());
    }

    #[test]
    fn test_toggle_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");

        {
            let store = PreferenceStore::open(&path).unwrap();
            let toggle = PrivacyToggle::load(store, true).unwrap();
            toggle.set(false).unwrap();
        }

        let store = PreferenceStore::open(&path).unwrap();
        let toggle = PrivacyToggle::load(store, true).unwrap();
        assert!(!toggle.is_enabled());
    }
}
