//! Key/value storage layer shared by every surface.
//!
//! One JSON-serializable value per key, backed by SQLite. Collection
//! mutations rewrite the whole value inside a single transaction, so
//! concurrent writers can no longer clobber each other's updates.

pub mod models;

use crate::{LockerError, Result};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Blocked-site list.
pub const KEY_BLOCKED_SITES: &str = "blocked_sites";
/// Global password hash (hex string).
pub const KEY_PASSWORD_HASH: &str = "password_hash";
/// Authorized-session list.
pub const KEY_AUTHORIZED_SESSIONS: &str = "authorized_sessions";
/// Settings object.
pub const KEY_SETTINGS: &str = "settings";

/// Thread-safe key/value store.
#[derive(Clone)]
pub struct KvStore {
    conn: Arc<Mutex<Connection>>,
}

impl KvStore {
    /// Open (or create) a store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create a new in-memory store for testing.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| LockerError::LockPoisoned)
    }

    /// Read the JSON value stored under `key`, if any. A stored value that
    /// fails to parse as JSON is treated as absent rather than an error.
    pub fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv_entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(raw.and_then(|s| serde_json::from_str(&s).ok()))
    }

    /// Replace the value stored under `key`.
    pub fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        let conn = self.lock()?;
        let raw = serde_json::to_string(value)?;
        conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, raw],
        )?;
        Ok(())
    }

    /// Atomic read-modify-write of one key inside a single transaction.
    pub fn update<F>(&self, key: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<Value>) -> Result<Value>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let raw: Option<String> = tx
            .query_row("SELECT value FROM kv_entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        let current = raw.and_then(|s| serde_json::from_str(&s).ok());

        let next = f(current)?;
        let encoded = serde_json::to_string(&next)?;
        tx.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, encoded],
        )?;

        tx.commit()?;
        Ok(())
    }
}
