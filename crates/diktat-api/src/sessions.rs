//! Server-side login sessions keyed by bearer token.
//!
//! Each session owns its training tracker behind its own mutex, so two
//! requests for the same user are serialized while different users never
//! contend beyond the brief map lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use diktat_core::types::{User, UserId};
use diktat_trainer::ProgressTracker;

use crate::auth::generate_token;
use crate::error::ApiError;

/// Per-login state.
#[derive(Debug)]
pub struct UserSession {
    pub user_id: UserId,
    pub username: String,
    pub theme: String,
    pub tracker: ProgressTracker,
    pub last_seen: DateTime<Utc>,
}

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<UserSession>>;

/// Lock a session, mapping poisoning to an internal error.
pub fn lock_session(handle: &SessionHandle) -> Result<MutexGuard<'_, UserSession>, ApiError> {
    handle
        .lock()
        .map_err(|e| ApiError::Internal(format!("Session lock poisoned: {}", e)))
}

/// Token-to-session map with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn map(&self) -> Result<MutexGuard<'_, HashMap<String, SessionHandle>>, ApiError> {
        self.sessions
            .lock()
            .map_err(|e| ApiError::Internal(format!("Session store lock poisoned: {}", e)))
    }

    /// Open a session for `user` and return its bearer token.
    pub fn create(&self, user: &User, theme: String) -> Result<String, ApiError> {
        let token = generate_token();
        let session = UserSession {
            user_id: user.id,
            username: user.username.clone(),
            theme,
            tracker: ProgressTracker::new(),
            last_seen: Utc::now(),
        };
        self.map()?
            .insert(token.clone(), Arc::new(Mutex::new(session)));
        info!(user_id = %user.id, "Session opened");
        Ok(token)
    }

    /// Look up a live session and mark it as seen.
    pub fn get(&self, token: &str) -> Result<Option<SessionHandle>, ApiError> {
        self.get_at(token, Utc::now())
    }

    pub(crate) fn get_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionHandle>, ApiError> {
        // The map guard is released before the session lock is taken, so a
        // busy session never blocks lookups for other tokens.
        let handle = self.map()?.get(token).cloned();
        let Some(handle) = handle else {
            return Ok(None);
        };

        let expired = {
            let mut session = lock_session(&handle)?;
            if now - session.last_seen > self.ttl {
                true
            } else {
                session.last_seen = now;
                false
            }
        };

        if expired {
            self.remove_if_current(token, &handle)?;
            debug!("Expired session rejected");
            return Ok(None);
        }
        Ok(Some(handle))
    }

    /// Remove `token` only while it still maps to `handle`; a session that
    /// replaced it in the meantime stays.
    fn remove_if_current(&self, token: &str, handle: &SessionHandle) -> Result<bool, ApiError> {
        let mut map = self.map()?;
        if map
            .get(token)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
        {
            map.remove(token);
            return Ok(true);
        }
        Ok(false)
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, token: &str) -> Result<bool, ApiError> {
        Ok(self.map()?.remove(token).is_some())
    }

    /// Drop every session idle longer than the TTL.
    pub fn purge_expired(&self) -> Result<usize, ApiError> {
        self.purge_expired_at(Utc::now())
    }

    pub(crate) fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize, ApiError> {
        let mut map = self.map()?;
        let before = map.len();
        let ttl = self.ttl;
        // A session locked by an in-flight request is in use, so keep it.
        map.retain(|_, handle| match handle.try_lock() {
            Ok(session) => now - session.last_seen <= ttl,
            Err(_) => true,
        });
        let purged = before - map.len();
        if purged > 0 {
            info!(purged, "Purged expired sessions");
        }
        Ok(purged)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.map().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
