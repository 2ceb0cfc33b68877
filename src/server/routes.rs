//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .assistant
        .config()
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(handlers::index))
        // Session events, each answered with 303 → /
        .route("/upload", post(handlers::upload))
        .route("/mode", post(handlers::select_mode))
        .route("/analyze", post(handlers::analyze))
        .route("/ask", post(handlers::ask))
        // JSON view of the session
        .route("/api/session", get(handlers::api_session))
        .route("/healthz", get(handlers::healthz))
        // Static assets
        .route("/static/style.css", get(handlers::serve_css))
        .route("/static/logo.svg", get(handlers::serve_logo))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
