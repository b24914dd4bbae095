//! Session tokens.
//!
//! Sessions are persisted as one JSON object mapping each token to `{"user": {...}}`. A token is
//! either absent or present; creating an existing token overwrites its user snapshot and deleting
//! an absent token does nothing. There is no expiry.

use crate::error::{StoreError, StoreResult};
use crate::locks::Collection;
use crate::models::{Session, User};
use crate::repositories::shared::{load_document, write_document};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    user: User,
}

type SessionMap = BTreeMap<String, StoredSession>;

impl RecordStore {
    fn load_sessions_unlocked(&self) -> SessionMap {
        load_document(Collection::Sessions, &self.path(Collection::Sessions))
    }

    fn save_sessions_unlocked(&self, sessions: &SessionMap) -> StoreResult<()> {
        write_document(
            Collection::Sessions,
            &self.path(Collection::Sessions),
            sessions,
        )
    }

    /// Binds `token` to a snapshot of `user`, replacing any existing binding.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] for a blank token, or a write error.
    pub fn create_session(&self, token: &str, user: &User) -> StoreResult<()> {
        if token.trim().is_empty() {
            return Err(StoreError::InvalidInput("session token is required".into()));
        }

        let _guard = self.locks.write(Collection::Sessions);
        let mut sessions = self.load_sessions_unlocked();
        sessions.insert(token.to_string(), StoredSession { user: user.clone() });
        self.save_sessions_unlocked(&sessions)?;

        tracing::debug!("session created for {}", user.username);
        Ok(())
    }

    /// The session for `token`, or `None` when the token is unknown.
    pub fn get_session(&self, token: &str) -> Option<Session> {
        let mut sessions = {
            let _guard = self.locks.read(Collection::Sessions);
            self.load_sessions_unlocked()
        };

        sessions.remove(token).map(|stored| Session {
            token: token.to_string(),
            user: stored.user,
        })
    }

    /// Removes `token`. Removing an unknown token succeeds without writing.
    pub fn delete_session(&self, token: &str) -> StoreResult<()> {
        let _guard = self.locks.write(Collection::Sessions);
        let mut sessions = self.load_sessions_unlocked();

        if sessions.remove(token).is_none() {
            return Ok(());
        }

        self.save_sessions_unlocked(&sessions)
    }

    /// Drops every session, leaving an empty token map on disk.
    pub fn clear_sessions(&self) -> StoreResult<()> {
        let _guard = self.locks.write(Collection::Sessions);
        self.save_sessions_unlocked(&SessionMap::new())
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        let _guard = self.locks.read(Collection::Sessions);
        self.load_sessions_unlocked().len()
    }
}
