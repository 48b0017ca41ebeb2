//! Diktat API crate - axum HTTP server and route handlers.
//!
//! Exposes registration, login, the dictation catalog, the training flow
//! (start, check, next, results), per-session settings and a health check.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sessions;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
