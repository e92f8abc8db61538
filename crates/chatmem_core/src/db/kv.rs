//! Durable key-value seam used by the conversation store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::OptionalExtension;

use super::connection;
use crate::error::{MemoryError, Result};

/// One write in a batch. `None` removes the key.
pub type KvWrite = (String, Option<Vec<u8>>);

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.set_many(vec![(key.to_string(), Some(value.to_vec()))])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.set_many(vec![(key.to_string(), None)])
    }

    /// Applies every write or none of them.
    fn set_many(&self, writes: Vec<KvWrite>) -> Result<()>;

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| MemoryError::Storage(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value.as_bytes())
    }
}

/// SQLite-backed store (`kv` table, WAL journal).
pub struct SqliteKvStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteKvStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let conn = connection::open_db_at(data_dir)?;
        tracing::debug!(dir = %data_dir.display(), "opened kv store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(connection::open_in_memory()?),
        })
    }

    fn conn(&self) -> MutexGuard<'_, rusqlite::Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn();
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_many(&self, writes: Vec<KvWrite>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for (key, value) in &writes {
            match value {
                Some(bytes) => {
                    tx.execute(
                        "INSERT INTO kv (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
                        rusqlite::params![key, bytes],
                    )?;
                }
                None => {
                    tx.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Ephemeral store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set_many(&self, writes: Vec<KvWrite>) -> Result<()> {
        let mut entries = self.entries();
        for (key, value) in writes {
            match value {
                Some(bytes) => {
                    entries.insert(key, bytes);
                }
                None => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}
