//! Application state shared across all route handlers.
//!
//! AppState holds the user store, the content repository and the session
//! map. It is passed to handlers via axum's State extractor.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use diktat_core::config::DiktatConfig;
use diktat_core::types::{ContentRepository, UserStore};

use crate::error::ApiError;
use crate::sessions::SessionStore;

/// Shared application state.
///
/// All fields use `Arc` (or are `Arc`-backed) for cheap cloning across
/// handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Mutex<DiktatConfig>>,
    /// Account storage.
    pub users: Arc<dyn UserStore>,
    /// Dictation texts.
    pub content: Arc<dyn ContentRepository>,
    /// Logged-in sessions.
    pub sessions: SessionStore,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: DiktatConfig,
        users: Arc<dyn UserStore>,
        content: Arc<dyn ContentRepository>,
    ) -> Self {
        let ttl = session_ttl(config.auth.session_ttl_hours);
        Self {
            config: Arc::new(Mutex::new(config)),
            users,
            content,
            sessions: SessionStore::new(ttl),
            start_time: Instant::now(),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Result<DiktatConfig, ApiError> {
        self.config
            .lock()
            .map(|c| c.clone())
            .map_err(|e| ApiError::Internal(format!("Config lock poisoned: {}", e)))
    }
}

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Idle TTL for sessions. Values below one hour are raised to one; values
/// too large for a duration fall back to the default with a warning.
pub fn session_ttl(hours: i64) -> chrono::Duration {
    chrono::Duration::try_hours(hours.max(1)).unwrap_or_else(|| {
        tracing::warn!(
            session_ttl_hours = hours,
            "session_ttl_hours out of range, using {}",
            DEFAULT_SESSION_TTL_HOURS
        );
        chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ttl_in_range() {
        assert_eq!(session_ttl(24), chrono::Duration::hours(24));
        assert_eq!(session_ttl(0), chrono::Duration::hours(1));
        assert_eq!(session_ttl(-5), chrono::Duration::hours(1));
    }

    #[test]
    fn test_session_ttl_out_of_range_falls_back() {
        assert_eq!(session_ttl(i64::MAX), chrono::Duration::hours(24));
    }
}
