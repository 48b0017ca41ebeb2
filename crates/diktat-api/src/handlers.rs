//! Route handler functions for all API endpoints.
//!
//! Training handlers lock the caller's session for the whole synchronous
//! tracker mutation and never hold the lock across an await point.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use diktat_content::{Catalog, CatalogFilters};
use diktat_core::types::{Attempt, DictationId, ResultSummary, TokenVerdict, Verdict};
use diktat_trainer::{ProgressTracker, RunState};

use crate::auth::{validate_registration, CurrentSession};
use crate::error::ApiError;
use crate::sessions::lock_session;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub dictation: DictationId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckRequest {
    pub user_input: String,
}

/// Optional guard for `/train/next`: the 1-based sentence the client is
/// advancing from. A stale number is rejected instead of skipping ahead.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextRequest {
    pub sentence_number: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub theme: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub dictation_count: u64,
    pub active_sessions: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub theme: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

/// One classified word, with the CSS class the client renders it with.
#[derive(Debug, Serialize, Deserialize)]
pub struct WordFeedback {
    pub token: String,
    pub classification: Verdict,
    pub badge_class: String,
}

impl From<&TokenVerdict> for WordFeedback {
    fn from(v: &TokenVerdict) -> Self {
        Self {
            token: v.token.clone(),
            classification: v.classification,
            badge_class: v.classification.badge_class().to_string(),
        }
    }
}

/// Verdict for the latest attempt at the current sentence.
#[derive(Debug, Serialize, Deserialize)]
pub struct Feedback {
    pub submitted: String,
    pub is_correct: bool,
    pub words: Vec<WordFeedback>,
}

impl From<&Attempt> for Feedback {
    fn from(attempt: &Attempt) -> Self {
        Self {
            submitted: attempt.submitted.clone(),
            is_correct: attempt.is_correct,
            words: attempt.verdicts.iter().map(WordFeedback::from).collect(),
        }
    }
}

/// What the training page shows.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainView {
    /// Every sentence has been advanced past; the client fetches results.
    pub finished: bool,
    pub run_id: Uuid,
    pub dictation_id: DictationId,
    pub title: String,
    pub state: String,
    pub sentence: Option<String>,
    /// 1-based position of the current sentence.
    pub sentence_number: usize,
    pub total_sentences: usize,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub run_id: Uuid,
    pub dictation_id: DictationId,
    pub title: String,
    /// Number of submissions, retries included.
    pub attempt_count: usize,
    pub summary: ResultSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub theme: String,
    pub available_themes: Vec<String>,
}

fn parse_next_request(body: &[u8]) -> Result<NextRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NextRequest::default());
    }
    let parsed: Option<NextRequest> = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;
    Ok(parsed.unwrap_or_default())
}

fn train_view(tracker: &ProgressTracker) -> Result<TrainView, ApiError> {
    let run = tracker
        .run()
        .ok_or_else(|| ApiError::NotFound("No dictation in progress".to_string()))?;
    let state = tracker.state();
    let finished = state == RunState::Completed;
    let sentence = if finished {
        None
    } else {
        Some(tracker.current_sentence()?.to_string())
    };

    Ok(TrainView {
        finished,
        run_id: run.id,
        dictation_id: run.dictation_id.clone(),
        title: run.title.clone(),
        state: state.to_string(),
        sentence,
        sentence_number: (run.current_index + 1).min(run.total()),
        total_sentences: run.total(),
        feedback: run.latest_attempt().map(Feedback::from),
    })
}

// =============================================================================
// Public handlers
// =============================================================================

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let dictation_count = match state.content.list_dictations() {
        Ok(ids) => ids.len() as u64,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list dictations for health check");
            0
        }
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        dictation_count,
        active_sessions: state.sessions.len() as u64,
    }))
}

/// POST /register - create an account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let min_len = state.config()?.auth.min_password_length;
    let errors = validate_registration(
        &body.username,
        &body.password,
        &body.confirm_password,
        min_len,
    );
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    if state.users.find_by_username(&body.username)?.is_some() {
        return Err(ApiError::Conflict(
            "Dieser Benutzername ist bereits vergeben.".to_string(),
        ));
    }

    // A concurrent registration can still win the insert; the store's
    // unique constraint maps that to the same conflict.
    let user_id = state.users.create(&body.username, &body.password)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user_id.0,
            username: body.username,
        }),
    ))
}

/// POST /login - verify credentials and open a session.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .users
        .verify(&body.username, &body.password)?
        .ok_or_else(|| {
            ApiError::Unauthorized("Ungültiger Benutzername oder Passwort.".to_string())
        })?;

    let theme = state.config()?.ui.default_theme;
    let token = state.sessions.create(&user, theme.clone())?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        theme,
    }))
}

// =============================================================================
// Protected handlers
// =============================================================================

/// POST /logout - close the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<ActionResult>, ApiError> {
    state.sessions.remove(&current.token)?;
    Ok(Json(ActionResult {
        success: true,
        message: "Logged out".to_string(),
    }))
}

/// GET /dictations - catalog listing with filters and facet values.
pub async fn dictations(
    State(state): State<AppState>,
    Query(filters): Query<CatalogFilters>,
) -> Result<Json<Catalog>, ApiError> {
    let catalog = Catalog::build(state.content.as_ref(), &filters)?;
    Ok(Json(catalog))
}

/// POST /train/start - begin a run, abandoning any run in progress.
pub async fn train_start(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Json(body): Json<StartRequest>,
) -> Result<Json<TrainView>, ApiError> {
    let mut session = lock_session(&current.handle)?;
    session
        .tracker
        .start(state.content.as_ref(), &body.dictation)?;
    Ok(Json(train_view(&session.tracker)?))
}

/// GET /train - current sentence, progress and latest feedback.
pub async fn train(
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<TrainView>, ApiError> {
    let session = lock_session(&current.handle)?;
    Ok(Json(train_view(&session.tracker)?))
}

/// POST /train/check - grade a submission for the current sentence.
pub async fn train_check(
    Extension(current): Extension<CurrentSession>,
    Json(body): Json<CheckRequest>,
) -> Result<Json<TrainView>, ApiError> {
    let mut session = lock_session(&current.handle)?;
    session.tracker.record_attempt(&body.user_input)?;
    Ok(Json(train_view(&session.tracker)?))
}

/// POST /train/next - move to the next sentence, clearing feedback.
///
/// The body is optional. When it carries `sentence_number`, the request only
/// advances if that is still the current sentence.
pub async fn train_next(
    Extension(current): Extension<CurrentSession>,
    body: Bytes,
) -> Result<Json<TrainView>, ApiError> {
    let expected = parse_next_request(&body)?.sentence_number;
    let mut session = lock_session(&current.handle)?;
    if let (Some(expected), Some(run)) = (expected, session.tracker.run()) {
        let current_number = run.current_index + 1;
        if expected != current_number {
            return Err(ApiError::Conflict(format!(
                "Sentence {} is no longer current (now at {})",
                expected, current_number
            )));
        }
    }
    session.tracker.advance()?;
    Ok(Json(train_view(&session.tracker)?))
}

/// GET /results - summarize the completed run and clear it.
pub async fn results(
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let mut session = lock_session(&current.handle)?;
    let completed = session.tracker.finalize()?;
    tracing::info!(
        user = %session.username,
        dictation = %completed.dictation_id,
        accuracy = completed.summary.word_accuracy,
        "Dictation finished"
    );

    Ok(Json(ResultsResponse {
        run_id: completed.run_id,
        dictation_id: completed.dictation_id,
        title: completed.title,
        attempt_count: completed.attempt_log.len(),
        summary: completed.summary,
    }))
}

/// GET /settings - the session's theme and the selectable themes.
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let available_themes = state.config()?.ui.themes;
    let session = lock_session(&current.handle)?;
    Ok(Json(SettingsResponse {
        theme: session.theme.clone(),
        available_themes,
    }))
}

/// PUT /settings - change the session's theme.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Json(body): Json<SettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let ui = state.config()?.ui;
    let theme = body.theme.trim();
    if !ui.is_known_theme(theme) {
        return Err(ApiError::Validation(vec![format!(
            "Unknown theme '{}'. Must be one of: {}",
            theme,
            ui.themes.join(", ")
        )]));
    }

    let mut session = lock_session(&current.handle)?;
    session.theme = theme.to_string();
    Ok(Json(SettingsResponse {
        theme: session.theme.clone(),
        available_themes: ui.themes,
    }))
}
