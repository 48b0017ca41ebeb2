use thiserror::Error;

/// Top-level error type for the Diktat system.
///
/// The trainer, content and storage crates all report through this type so
/// that the `?` operator works across crate boundaries. The web layer maps
/// each variant onto an HTTP status.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiktatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unknown dictation id, or the tracker was queried without an active run.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A sentence was requested past the end of the run.
    #[error("Sentence index {index} out of range (total {total})")]
    OutOfRange { index: usize, total: usize },

    /// An operation was invoked from a state that does not permit it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl From<toml::de::Error> for DiktatError {
    fn from(err: toml::de::Error) -> Self {
        DiktatError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DiktatError {
    fn from(err: toml::ser::Error) -> Self {
        DiktatError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DiktatError {
    fn from(err: serde_json::Error) -> Self {
        DiktatError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Diktat operations.
pub type Result<T> = std::result::Result<T, DiktatError>;
