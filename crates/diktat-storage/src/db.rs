//! SQLite handle for the account database.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use diktat_core::error::DiktatError;

use crate::migrations;

fn storage_err(context: &str) -> impl Fn(rusqlite::Error) -> DiktatError + '_ {
    move |e| DiktatError::Storage(format!("{}: {}", context, e))
}

/// One connection shared by all requests; rusqlite's Connection is not Sync.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open `path` (creating its directory), switch to WAL and migrate.
    pub fn new(path: &Path) -> Result<Self, DiktatError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(storage_err("Failed to open user database"))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(storage_err("Failed to enable WAL"))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(storage_err("Failed to set synchronous"))?;
        info!(path = %path.display(), "User database opened");
        Self::migrated(conn)
    }

    /// Throwaway database for tests and demos.
    pub fn in_memory() -> Result<Self, DiktatError> {
        let conn =
            Connection::open_in_memory().map_err(storage_err("Failed to open user database"))?;
        Self::migrated(conn)
    }

    fn migrated(conn: Connection) -> Result<Self, DiktatError> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` while holding the connection lock.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DiktatError>
    where
        F: FnOnce(&Connection) -> Result<T, DiktatError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DiktatError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usernames(db: &Database) -> Vec<String> {
        db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT username FROM users ORDER BY id")
                .map_err(|e| DiktatError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| row.get(0))
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<String>>>())
                .map_err(|e| DiktatError::Storage(e.to_string()))?;
            Ok(rows)
        })
        .unwrap()
    }

    fn insert(db: &Database, username: &str) -> Result<usize, DiktatError> {
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, 'x')",
                [username],
            )
            .map_err(|e| DiktatError::Storage(e.to_string()))
        })
    }

    #[test]
    fn test_shared_between_request_threads() {
        let db = std::sync::Arc::new(Database::in_memory().unwrap());
        let handles: Vec<_> = ["anna", "bernd", "clara"]
            .into_iter()
            .map(|name| {
                let db = std::sync::Arc::clone(&db);
                std::thread::spawn(move || insert(&db, name).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut names = usernames(&db);
        names.sort();
        assert_eq!(names, vec!["anna", "bernd", "clara"]);
    }

    #[test]
    fn test_accounts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("users.db");

        let db = Database::new(&path).unwrap();
        insert(&db, "anna").unwrap();
        let mode: String = db
            .with_conn(|conn| {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
                    .map_err(|e| DiktatError::Storage(e.to_string()))
            })
            .unwrap();
        assert_eq!(mode, "wal");
        drop(db);

        let reopened = Database::new(&path).unwrap();
        assert_eq!(usernames(&reopened), vec!["anna"]);
    }
}
