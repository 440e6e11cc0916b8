use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::HandoffStore;
use crate::logging::{log_slot_clear, log_slot_read, log_slot_write, ts_now};

/// Durable handoff slots in a SQLite file. Survives process restarts the
/// way browser storage survives page reloads.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open handoff db {}", path))?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn init(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS handoff (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                written_at TEXT NOT NULL
            );
            COMMIT;",
        )?;
        Ok(())
    }

    /// Open `path` and make sure the schema exists.
    pub fn open(path: &str) -> Result<Self> {
        let mut store = Self::new(path)?;
        store.init()?;
        Ok(store)
    }

    /// RFC3339 time of the last write to `key`.
    pub fn written_at(&self, key: &str) -> Result<Option<String>> {
        let ts = self
            .conn
            .query_row(
                "SELECT written_at FROM handoff WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts)
    }
}

impl HandoffStore for SqliteStore {
    fn put(&mut self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO handoff (key, value, written_at) VALUES (?1, ?2, ?3)",
            params![key, text, ts_now()],
        )?;
        log_slot_write(key, &text);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let text: Option<String> = self
            .conn
            .query_row("SELECT value FROM handoff WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        log_slot_read(key, text.as_deref());
        Ok(text)
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM handoff WHERE key = ?1", params![key])?;
        log_slot_clear(key);
        Ok(())
    }
}
