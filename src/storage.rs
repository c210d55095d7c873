use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::model::GridError;

pub const SCHEMA_VERSION: u32 = 1;

/// Versioned on-disk shape of one game session. Cell values are the strings
/// shown in the grid, "" for an empty cell, so the document round-trips the
/// table exactly. Round plans are not stored; they are regenerated from the
/// game descriptor and the roster size.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SavedSession {
    pub version: u32,
    pub game: String,
    pub players: Vec<String>,
    pub scores: BTreeMap<String, Vec<String>>,
    pub target_score: Option<i32>,
    pub saved_at: String,
}

impl SavedSession {
    #[must_use]
    pub fn storage_key(game: &str) -> String {
        format!("session:{game}")
    }
}

/// The persistence seam. One synchronous write per mutation, no batching; a
/// failed write leaves the in-memory state authoritative.
pub trait KvStore: Send + Sync {
    /// # Errors
    ///
    /// Will return `Err` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, GridError>;
    /// # Errors
    ///
    /// Will return `Err` if the backing store cannot be written.
    fn put(&self, key: &str, value: &str) -> Result<(), GridError>;
    /// # Errors
    ///
    /// Will return `Err` if the backing store cannot be written.
    fn delete(&self, key: &str) -> Result<(), GridError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, GridError> {
        let entries = self.entries.lock().map_err(|e| GridError::Store(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), GridError> {
        let mut entries = self.entries.lock().map_err(|e| GridError::Store(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), GridError> {
        let mut entries = self.entries.lock().map_err(|e| GridError::Store(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Single-table sqlite store, bundled build, no pool: one serialized
/// connection is plenty for fire-and-forget session writes.
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    /// # Errors
    ///
    /// Will return `Err` if the database cannot be opened or migrated.
    pub fn open(path: &str) -> Result<Self, GridError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// # Errors
    ///
    /// Will return `Err` if the database cannot be opened or migrated.
    pub fn open_in_memory() -> Result<Self, GridError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, GridError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, GridError> {
        let conn = self.conn.lock().map_err(|e| GridError::Store(e.to_string()))?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), GridError> {
        let conn = self.conn.lock().map_err(|e| GridError::Store(e.to_string()))?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), GridError> {
        let conn = self.conn.lock().map_err(|e| GridError::Store(e.to_string()))?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
