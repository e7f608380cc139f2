//src/store.rs
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DB_FILE_NAME: &str = "mapty.sqlite";
const APP_DATA_DIR: &str = "mapty";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend failed: {0}")]
    Backend(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: usize, quota: usize },
}

/// String keyed persistent storage, the equivalent of a browser's local storage.
pub trait KeyValueStore {
    /// # Errors
    /// Returns `StoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Overwrites any previous value.
    /// # Errors
    /// Returns `StoreError::QuotaExceeded` or a backend error.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    /// # Errors
    /// Returns `StoreError` if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

fn check_quota(
    quota: Option<usize>,
    used_by_others: usize,
    key: &str,
    value: &str,
) -> Result<(), StoreError> {
    if let Some(quota) = quota {
        let needed = used_by_others + key.len() + value.len();
        if needed > quota {
            return Err(StoreError::QuotaExceeded { needed, quota });
        }
    }
    Ok(())
}

/// Gets the path to the SQLite database file within the app's data directory.
pub fn get_db_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir().ok_or(StoreError::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Key-value table in a SQLite database.
pub struct SqliteStore {
    conn: Connection,
    quota: Option<usize>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    /// # Errors
    /// Returns `StoreError` if the file cannot be opened or the table created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// # Errors
    /// Returns `StoreError` if the table cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn, quota: None })
    }

    /// Caps the total size (keys + values, in bytes) the store accepts.
    #[must_use]
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    fn used_by_others(&self, key: &str) -> Result<usize, StoreError> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv WHERE key != ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(used).unwrap_or(usize::MAX))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StoreError::from)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.quota.is_some() {
            check_quota(self.quota, self.used_by_others(key)?, key, value)?;
        }
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let used_by_others: usize = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        check_quota(self.quota, used_by_others, key, value)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
