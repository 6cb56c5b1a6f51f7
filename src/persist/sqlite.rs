//! SQLite-backed key-value snapshot store.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::{core::ledger::Snapshot, types::now_ms};

use super::{PersistResult, SnapshotStore};

/// SQLite implementation of [`crate::persist::SnapshotStore`].
///
/// Each key holds exactly one row; every save replaces the payload and bumps
/// the row's revision.
pub struct SqliteSnapshotStore {
    conn: Connection,
}

impl SqliteSnapshotStore {
    /// Opens or creates a SQLite-backed store at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite store.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Number of saves applied to `key`, or 0 if never written.
    pub fn revision(&self, key: &str) -> PersistResult<u64> {
        let seq: Option<i64> = self
            .conn
            .query_row("SELECT seq FROM snapshots WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(seq.unwrap_or(0) as u64)
    }

    /// Raw stored payload for `key`.
    pub fn raw(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        let payload = self
            .conn
            .query_row("SELECT payload FROM snapshots WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(payload)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, key: &str) -> PersistResult<Option<Snapshot>> {
        let Some(payload) = self.raw(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&payload)?))
    }

    fn save(&mut self, key: &str, snapshot: &Snapshot) -> PersistResult<()> {
        let payload = serde_json::to_vec(snapshot)?;
        self.conn.execute(
            "INSERT INTO snapshots(key, seq, ts_ms, payload) VALUES (?1, 1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 seq = seq + 1,
                 ts_ms = excluded.ts_ms,
                 payload = excluded.payload",
            params![key, now_ms() as i64, payload],
        )?;
        Ok(())
    }
}
