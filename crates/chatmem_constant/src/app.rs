//! Application metadata constants

pub const NAME: &str = "chatmem";
pub const DISPLAY_NAME: &str = "chatmem";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Chat client with compacting conversation memory";

/// Directory name for chatmem data under the user's home
pub const DATA_DIR: &str = ".chatmem";
/// Basename of the durable store (SQLite creates .db-wal and .db-shm alongside)
pub const DB_FILE: &str = "chatmem.db";
/// Env file under DATA_DIR, loaded by the CLI before parsing arguments
pub const ENV_FILE: &str = "env";
