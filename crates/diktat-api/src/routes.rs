//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, body limits and all
//! endpoint handlers, and runs the server.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use diktat_core::config::DiktatConfig;
use diktat_core::error::DiktatError;

use crate::handlers;
use crate::state::AppState;

/// How often idle sessions are swept.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS middleware: allow the configured port on localhost.
    let port = state.config.lock().map(|c| c.general.port).unwrap_or(5000);
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Routes that do NOT require authentication.
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/dictations", get(handlers::dictations))
        .route("/train", get(handlers::train))
        .route("/train/start", post(handlers::train_start))
        .route("/train/check", post(handlers::train_check))
        .route("/train/next", post(handlers::train_next))
        .route("/results", get(handlers::results))
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
///
/// Binds to 127.0.0.1 (localhost only) and sweeps idle sessions in the
/// background while serving.
pub async fn start_server(config: &DiktatConfig, state: AppState) -> Result<(), DiktatError> {
    let addr = format!("127.0.0.1:{}", config.general.port);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = sessions.purge_expired() {
                tracing::warn!(error = %e, "Session purge failed");
            }
        }
    });

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DiktatError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| DiktatError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
