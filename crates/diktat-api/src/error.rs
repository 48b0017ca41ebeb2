//! API error types and JSON error response formatting.
//!
//! ApiError gives every endpoint the same JSON error body and maps
//! trainer, content and storage errors to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use diktat_core::error::DiktatError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "not_found", "invalid_state").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details, such as validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400 Bad Request - malformed or missing parameters.
    #[error("{0}")]
    BadRequest(String),
    /// 401 Unauthorized - missing, unknown or expired session.
    #[error("{0}")]
    Unauthorized(String),
    /// 404 Not Found - unknown dictation or no run in progress.
    #[error("{0}")]
    NotFound(String),
    /// 409 Conflict - sentence index past the end of the run.
    #[error("{0}")]
    OutOfRange(String),
    /// 409 Conflict - operation not allowed in the current run state.
    #[error("{0}")]
    InvalidState(String),
    /// 409 Conflict - resource already exists or the request is stale.
    #[error("{0}")]
    Conflict(String),
    /// 422 Unprocessable Entity - every failed validation rule.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// 500 Internal Server Error - unexpected server error.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::OutOfRange(msg) => (StatusCode::CONFLICT, "out_of_range", msg, None),
            ApiError::InvalidState(msg) => (StatusCode::CONFLICT, "invalid_state", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(messages) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                messages.join("; "),
                Some(serde_json::json!(messages)),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DiktatError> for ApiError {
    fn from(err: DiktatError) -> Self {
        match err {
            DiktatError::NotFound(msg) => ApiError::NotFound(msg),
            e @ DiktatError::OutOfRange { .. } => ApiError::OutOfRange(e.to_string()),
            DiktatError::InvalidState(msg) => ApiError::InvalidState(msg),
            DiktatError::AlreadyExists(msg) => ApiError::Conflict(msg),
            DiktatError::Config(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
