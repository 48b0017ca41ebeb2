//! Diktat core crate - shared types, collaborator traits, configuration and errors.
//!
//! Every other crate in the workspace depends on this one. It has no
//! knowledge of HTTP, SQLite or the file system layout of dictations.

pub mod config;
pub mod error;
pub mod types;

pub use config::DiktatConfig;
pub use error::{DiktatError, Result};
pub use types::*;
