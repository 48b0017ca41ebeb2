//! Diktat storage crate - SQLite persistence for user accounts.
//!
//! Provides a WAL-mode SQLite database with migrations, the SQLite-backed
//! `UserStore`, and the password hashing it relies on.

pub mod db;
pub mod migrations;
pub mod password;
pub mod users;

pub use db::Database;
pub use users::SqliteUserStore;
