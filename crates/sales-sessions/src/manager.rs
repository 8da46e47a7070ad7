use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use sales_core::types::SessionId;
use tracing::{debug, instrument};

use crate::error::{Result, SessionError};
use crate::types::ConversationState;

/// Thread-safe store for `ConversationState`, backed by SQLite with
/// optimistic concurrency on `version` (§4.1, I5).
///
/// Wraps a single connection in a `Mutex`: sufficient for a single-node
/// deployment, with a connection pool as the natural upgrade path for
/// horizontal scale.
pub struct SessionManager {
    db: Mutex<Connection>,
}

impl SessionManager {
    pub fn new(conn: Connection) -> Self {
        Self { db: Mutex::new(conn) }
    }

    /// `Load(session_id) -> (state, version) | NotFound` (§4.1).
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub fn load(&self, session_id: &SessionId) -> Result<Option<ConversationState>> {
        let db = self.db.lock().unwrap();
        let row: Option<String> = db
            .query_row(
                "SELECT state_json FROM sessions WHERE session_id = ?1",
                rusqlite::params![session_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Create a brand-new session row at version 0. Returns a conflict error
    /// if the session already exists — callers should `load` first.
    #[instrument(skip(self, state), fields(session_id = %state.session_id))]
    pub fn create(&self, state: &ConversationState) -> Result<()> {
        let db = self.db.lock().unwrap();
        let json = serde_json::to_string(state)?;
        db.execute(
            "INSERT INTO sessions
             (session_id, version, state_json, phase, created_at, last_activity_at, terminated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                state.session_id.as_str(),
                state.version as i64,
                json,
                state.phase.to_string(),
                state.created_at,
                state.last_activity_at,
                state.terminated_at,
            ],
        )?;
        Ok(())
    }

    /// `Save(state, expected_version) -> NewVersion | VersionConflict` (§4.1, I5).
    ///
    /// The `UPDATE ... WHERE version = ?` compare-and-swap is the same
    /// pattern `SessionManager::update_stats` uses for its row-count check,
    /// generalized here to detect a lost race rather than a missing row.
    #[instrument(skip(self, state), fields(session_id = %state.session_id, expected_version))]
    pub fn save(&self, state: &mut ConversationState, expected_version: u64) -> Result<u64> {
        let db = self.db.lock().unwrap();
        let new_version = expected_version + 1;
        let json = {
            // Bump the version on the in-memory copy before serializing so
            // the persisted row and the caller's handle agree (I5).
            state.version = new_version;
            serde_json::to_string(state)?
        };

        let rows_changed = db.execute(
            "UPDATE sessions
             SET version = ?1, state_json = ?2, phase = ?3,
                 last_activity_at = ?4, terminated_at = ?5
             WHERE session_id = ?6 AND version = ?7",
            rusqlite::params![
                new_version as i64,
                json,
                state.phase.to_string(),
                state.last_activity_at,
                state.terminated_at,
                state.session_id.as_str(),
                expected_version as i64,
            ],
        )?;

        if rows_changed == 0 {
            // Roll the in-memory bump back; the caller must reload.
            state.version = expected_version;
            let found: Option<i64> = db
                .query_row(
                    "SELECT version FROM sessions WHERE session_id = ?1",
                    rusqlite::params![state.session_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            return match found {
                Some(found_version) => Err(SessionError::VersionConflict {
                    session_id: state.session_id.as_str().to_string(),
                    expected: expected_version,
                    found: found_version as u64,
                }),
                None => Err(SessionError::NotFound {
                    session_id: state.session_id.as_str().to_string(),
                }),
            };
        }

        debug!(new_version, "session saved");
        Ok(new_version)
    }

    /// `Terminate(session_id, reason)` (§4.1) — sets `terminated_at`, leaves
    /// the row in place for later audit/read (`GetConversation`).
    #[instrument(skip(self), fields(session_id = %session_id, reason))]
    pub fn terminate(&self, session_id: &SessionId, reason: &str, now: &str) -> Result<()> {
        debug!(reason, "terminating session");
        let db = self.db.lock().unwrap();
        let rows_changed = db.execute(
            "UPDATE sessions SET terminated_at = ?1, phase = 'terminal' WHERE session_id = ?2",
            rusqlite::params![now, session_id.as_str()],
        )?;
        if rows_changed == 0 {
            return Err(SessionError::NotFound {
                session_id: session_id.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Idempotency check: has `(session_id, client_message_id)` already been
    /// committed? If so, return the `agent_text` produced the first time
    /// (§4.1, P6) so the caller can short-circuit without re-running the
    /// pipeline.
    #[instrument(skip(self), fields(session_id = %session_id, client_message_id))]
    pub fn check_replay(&self, session_id: &SessionId, client_message_id: &str) -> Result<Option<String>> {
        let db = self.db.lock().unwrap();
        let agent_text: Option<String> = db
            .query_row(
                "SELECT agent_text FROM idempotency_ledger
                 WHERE session_id = ?1 AND client_message_id = ?2",
                rusqlite::params![session_id.as_str(), client_message_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(agent_text)
    }

    /// Record the outcome of a freshly committed `(session_id,
    /// client_message_id)` so future replays short-circuit (§4.1, P6).
    ///
    /// `INSERT OR IGNORE` makes this safe against the race where two
    /// retries of the same idempotency key commit concurrently — the first
    /// writer wins, matching `SessionManager::get_or_create`'s read-back
    /// idiom for resolving insert races.
    pub fn record_commit(
        &self,
        session_id: &SessionId,
        client_message_id: &str,
        agent_text: &str,
        now: &str,
    ) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO idempotency_ledger
             (session_id, client_message_id, agent_text, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![session_id.as_str(), client_message_id, agent_text, now],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::types::Role;
    use crate::types::CustomerProfile;

    fn manager() -> SessionManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        SessionManager::new(conn)
    }

    #[test]
    fn create_then_load_roundtrips() {
        let mgr = manager();
        let sid = SessionId::new();
        let state = ConversationState::new(sid.clone(), CustomerProfile::default(), "t0");
        mgr.create(&state).unwrap();

        let loaded = mgr.load(&sid).unwrap().unwrap();
        assert_eq!(loaded.session_id, sid);
        assert_eq!(loaded.version, 0);
    }

    #[test]
    fn save_with_correct_version_succeeds_and_bumps() {
        let mgr = manager();
        let sid = SessionId::new();
        let mut state = ConversationState::new(sid.clone(), CustomerProfile::default(), "t0");
        mgr.create(&state).unwrap();

        state.append_message(Role::User, "hi", "t1", 1);
        let v = mgr.save(&mut state, 0).unwrap();
        assert_eq!(v, 1);

        let reloaded = mgr.load(&sid).unwrap().unwrap();
        assert_eq!(reloaded.version, 1);
        assert_eq!(reloaded.transcript.len(), 1);
    }

    #[test]
    fn save_with_stale_version_conflicts() {
        let mgr = manager();
        let sid = SessionId::new();
        let mut state = ConversationState::new(sid.clone(), CustomerProfile::default(), "t0");
        mgr.create(&state).unwrap();

        // Winner bumps to version 1.
        let mut winner = state.clone();
        mgr.save(&mut winner, 0).unwrap();

        // Loser still thinks version is 0.
        let err = mgr.save(&mut state, 0).unwrap_err();
        assert!(matches!(err, SessionError::VersionConflict { expected: 0, found: 1, .. }));
    }

    #[test]
    fn idempotency_ledger_roundtrips() {
        let mgr = manager();
        let sid = SessionId::new();
        assert!(mgr.check_replay(&sid, "m1").unwrap().is_none());
        mgr.record_commit(&sid, "m1", "hello there", "t0").unwrap();
        assert_eq!(mgr.check_replay(&sid, "m1").unwrap().unwrap(), "hello there");
        // Duplicate commit is ignored, first write wins.
        mgr.record_commit(&sid, "m1", "different text", "t1").unwrap();
        assert_eq!(mgr.check_replay(&sid, "m1").unwrap().unwrap(), "hello there");
    }
}
