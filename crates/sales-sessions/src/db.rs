use rusqlite::Connection;

use crate::error::Result;

/// Initialise the sessions table, its idempotency ledger, and indexes.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            session_id          TEXT PRIMARY KEY,
            version             INTEGER NOT NULL DEFAULT 0,
            state_json          TEXT NOT NULL,
            phase               TEXT NOT NULL,
            created_at          TEXT NOT NULL,
            last_activity_at    TEXT NOT NULL,
            terminated_at       TEXT
         );
         CREATE INDEX IF NOT EXISTS idx_sessions_activity
            ON sessions(last_activity_at DESC);

         -- Idempotency ledger: (session_id, client_message_id) -> the
         -- agent_text produced the first time, so a replay (P6) can return
         -- the identical response without growing the transcript again.
         CREATE TABLE IF NOT EXISTS idempotency_ledger (
            session_id        TEXT NOT NULL,
            client_message_id TEXT NOT NULL,
            agent_text        TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            PRIMARY KEY (session_id, client_message_id)
         );",
    )?;
    Ok(())
}
