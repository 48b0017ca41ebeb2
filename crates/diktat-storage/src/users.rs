//! SQLite-backed user store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rusqlite::{ErrorCode, OptionalExtension};
use tracing::{debug, info};

use diktat_core::error::{DiktatError, Result};
use diktat_core::types::{User, UserId, UserStore};

use crate::db::Database;
use crate::password::{hash_password, verify_password};

/// Accounts persisted in the `users` table.
pub struct SqliteUserStore {
    db: Arc<Database>,
    hash_iterations: u32,
}

impl SqliteUserStore {
    pub fn new(db: Arc<Database>, hash_iterations: u32) -> Self {
        Self {
            db,
            hash_iterations,
        }
    }

    /// Fetch a user row together with its stored password hash.
    fn find_with_hash(&self, username: &str) -> Result<Option<(User, String)>> {
        self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password_hash, created_at
                     FROM users WHERE username = ?1",
                    rusqlite::params![username],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, i64>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(|e| DiktatError::Storage(e.to_string()))?;

            Ok(row.map(|(id, username, hash, created_at)| {
                let user = User {
                    id: UserId(id),
                    username,
                    created_at: Utc
                        .timestamp_opt(created_at, 0)
                        .single()
                        .unwrap_or_default(),
                };
                (user, hash)
            }))
        })
    }
}

impl UserStore for SqliteUserStore {
    fn create(&self, username: &str, password: &str) -> Result<UserId> {
        let hash = hash_password(password, self.hash_iterations)?;
        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                rusqlite::params![username, hash],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    DiktatError::AlreadyExists(
                        "Dieser Benutzername ist bereits vergeben.".to_string(),
                    )
                }
                other => DiktatError::Storage(format!("Failed to create user: {}", other)),
            })?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(user_id = id, username = %username, "User registered");
        Ok(UserId(id))
    }

    fn verify(&self, username: &str, password: &str) -> Result<Option<User>> {
        match self.find_with_hash(username)? {
            Some((user, hash)) if verify_password(password, &hash) => Ok(Some(user)),
            Some(_) => {
                debug!(username = %username, "Password mismatch");
                Ok(None)
            }
            None => {
                // Same hashing cost as a real check, so unknown names are
                // not distinguishable by response time.
                let _ = hash_password(password, self.hash_iterations);
                Ok(None)
            }
        }
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.find_with_hash(username)?.map(|(user, _)| user))
    }
}
