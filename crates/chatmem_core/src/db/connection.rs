//! Open the store DB with WAL and migrations.

use anyhow::{Context, Result};
use std::path::Path;

use super::layout;
use super::migrations;

/// Opens the DB under `data_dir` (e.g. ~/.chatmem).
/// Creates the dir if needed, enables WAL, runs migrations.
pub fn open_db_at(data_dir: &Path) -> Result<rusqlite::Connection> {
    let db_path = layout::ensure_data_dir(data_dir)?;
    let conn = rusqlite::Connection::open(&db_path).context("open chatmem.db")?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
    migrations::run_all(&conn)?;
    Ok(conn)
}

/// In-memory DB with the same schema.
pub fn open_in_memory() -> Result<rusqlite::Connection> {
    let conn = rusqlite::Connection::open_in_memory().context("open in-memory db")?;
    migrations::run_all(&conn)?;
    Ok(conn)
}
