//! SQL schema for the store DB. Applied on open.

/// Key-value table. Values are opaque bytes (JSON for the conversation index).
pub const KV: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
);
";

pub fn run_all(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    conn.execute_batch(KV)?;
    Ok(())
}
