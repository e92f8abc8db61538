//! `.chatmem/` directory layout.
//!
//! - `chatmem.db` + WAL: key-value store holding the conversation index,
//!   the current pointer and user preferences.
//! - `env`: optional dotenv file read by the CLI at startup.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use chatmem_constant::app::{DB_FILE, ENV_FILE};

/// Ensures `data_dir` exists; returns the path to chatmem.db.
pub fn ensure_data_dir(data_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir).context("create data dir")?;
    Ok(data_dir.join(DB_FILE))
}

/// Default data dir: `~/.chatmem`, or `./.chatmem` when there is no home dir.
pub fn default_data_dir() -> PathBuf {
    let name = chatmem_constant::app::DATA_DIR;
    dirs::home_dir()
        .map(|home| home.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}
