//! Durable storage under `.chatmem/`.
//!
//! - `chatmem.db` + WAL: single `kv` table.
//! - `env`: optional dotenv file loaded by the CLI.

mod connection;
mod kv;
mod layout;
mod migrations;

pub use connection::{open_db_at, open_in_memory};
pub use kv::{KvStore, KvWrite, MemoryKvStore, SqliteKvStore};
pub use layout::{default_data_dir, ensure_data_dir, DB_FILE, ENV_FILE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_data_dir_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join(".chatmem");
        let db_path = ensure_data_dir(&data_dir).unwrap();
        assert_eq!(db_path, data_dir.join(DB_FILE));
        assert!(data_dir.is_dir());
    }

    #[test]
    fn open_db_creates_kv_table() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_db_at(dir.path()).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert!(dir.path().join(DB_FILE).exists());
    }
}
