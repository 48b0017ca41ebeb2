//! Session authentication via bearer tokens.
//!
//! Provides token generation, registration input checks and the middleware
//! that resolves `Authorization: Bearer <token>` to a live session.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::Rng;

use crate::error::ApiError;
use crate::sessions::SessionHandle;
use crate::state::AppState;

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// The session resolved by [`require_auth`], available to handlers as an
/// `Extension`.
#[derive(Clone)]
pub struct CurrentSession {
    pub token: String,
    pub handle: SessionHandle,
}

/// Collect every registration problem. An empty list means the input is valid.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
    min_password_length: usize,
) -> Vec<String> {
    let mut errors = Vec::new();

    if username.trim().is_empty() || password.is_empty() {
        errors.push("Bitte füllen Sie alle Felder aus.".to_string());
    }
    if password != confirm_password {
        errors.push("Die Passwörter stimmen nicht überein.".to_string());
    }
    if password.chars().count() < min_password_length {
        errors.push(format!(
            "Das Passwort muss mindestens {} Zeichen lang sein.",
            min_password_length
        ));
    }

    errors
}

/// Middleware that validates Bearer token authentication.
///
/// Looks the token up in the session store and attaches the session to the
/// request. Returns 401 if the header is missing, malformed, unknown or
/// expired.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match bearer_token(&req) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    match state.sessions.get(&token) {
        Ok(Some(handle)) => {
            req.extensions_mut().insert(CurrentSession { token, handle });
            next.run(req).await
        }
        Ok(None) => ApiError::Unauthorized("Invalid or expired session".to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

fn bearer_token(req: &Request) -> Result<String, ApiError> {
    let value = req
        .headers()
        .get("authorization")
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header encoding".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration("anna", "geheim123", "geheim123", 8).is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let errors = validate_registration("  ", "geheim123", "geheim123", 8);
        assert_eq!(errors, vec!["Bitte füllen Sie alle Felder aus."]);
    }

    #[test]
    fn test_all_problems_reported() {
        let errors = validate_registration("anna", "kurz", "anders", 8);
        assert_eq!(
            errors,
            vec![
                "Die Passwörter stimmen nicht überein.".to_string(),
                "Das Passwort muss mindestens 8 Zeichen lang sein.".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_password_reports_every_rule() {
        let errors = validate_registration("anna", "", "x", 8);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_min_length_counts_characters() {
        // Eight characters, more than eight bytes.
        assert!(validate_registration("anna", "äöüßäöüß", "äöüßäöüß", 8).is_empty());
    }
}
