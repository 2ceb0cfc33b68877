//! Web interface for the assistant.
//!
//! A single page with a sidebar (upload, mode selection, action buttons) and
//! a main area (prompt, error or the read-only result). Every control is a
//! plain HTML form that posts one discrete event and is redirected back to
//! `/`, so a reload never repeats an analysis.
//!
//! One [`Session`] serves the whole process. Its mutex is held only while
//! the session is read or updated, never across extraction or the remote
//! call; the session's busy flag turns a second submission into
//! `409 Conflict`.

mod assets;
mod handlers;
mod routes;
mod templates;

pub use routes::create_router;

use crate::session::Session;
use crate::workflow::Assistant;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(assistant: Assistant) -> Self {
        Self {
            assistant: Arc::new(assistant),
            session: Arc::new(Mutex::new(Session::new())),
        }
    }
}

/// Start the web server and run until the listener fails.
pub async fn serve(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
