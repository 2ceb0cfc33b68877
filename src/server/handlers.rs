//! HTTP handlers.
//!
//! Page events (`/upload`, `/mode`, `/analyze`, `/ask`) update the session
//! and answer `303 See Other` → `/`. A submission that arrives while an
//! analysis is running gets `409 Conflict` with the current page instead.

use askama::Template;
use axum::{
    extract::{Form, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use tracing::{debug, warn};

use super::assets;
use super::templates::IndexTemplate;
use super::AppState;
use crate::analysis::AnalysisMode;
use crate::error::AssistantError;
use crate::session::{Action, Session};

/// Multipart field carrying the report.
pub const UPLOAD_FIELD: &str = "report";

#[derive(Debug, Deserialize)]
pub struct ModeForm {
    pub mode: String,
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

fn render_page(session: &Session) -> Html<String> {
    let template = IndexTemplate::from_session(session);
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Failed to render page: {e}")),
    )
}

fn back_home() -> Response {
    Redirect::to("/").into_response()
}

fn conflict(session: &Session) -> Response {
    (StatusCode::CONFLICT, render_page(session)).into_response()
}

/// The application page.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.lock().await;
    render_page(&session)
}

/// Accept a report, extract it, and make it the session's document.
pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    {
        let session = state.session.lock().await;
        if session.is_busy() {
            return conflict(&session);
        }
    }

    let outcome = match read_report_field(multipart).await {
        Ok((file_name, bytes)) => state.assistant.ingest(&file_name, bytes).await,
        Err(e) => Err(e),
    };

    let mut session = state.session.lock().await;
    if session.is_busy() {
        return conflict(&session);
    }
    match outcome {
        Ok(document) => session.load_document(document),
        Err(e) => {
            warn!("Upload failed: {e}");
            session.reject_upload(&e);
        }
    }
    back_home()
}

/// Pull the `report` file out of the multipart body.
async fn read_report_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), AssistantError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AssistantError::MalformedUpload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AssistantError::MalformedUpload(e.to_string()))?;
        if file_name.is_empty() && bytes.is_empty() {
            return Err(AssistantError::MissingUpload);
        }
        debug!("Received upload '{file_name}' ({} bytes)", bytes.len());
        return Ok((file_name, bytes.to_vec()));
    }
    Err(AssistantError::MissingUpload)
}

/// Change the selected mode. Never calls the completion service.
pub async fn select_mode(State(state): State<AppState>, Form(form): Form<ModeForm>) -> Response {
    match AnalysisMode::from_form_value(&form.mode) {
        Some(mode) => state.session.lock().await.select_mode(mode),
        None => warn!("Ignoring unknown mode '{}'", form.mode),
    }
    back_home()
}

/// "Analiz Et": summarize and recommend.
pub async fn analyze(State(state): State<AppState>) -> Response {
    run_action(state, Action::Analyze).await
}

/// "Sor": answer a question about the report.
pub async fn ask(State(state): State<AppState>, Form(form): Form<AskForm>) -> Response {
    run_action(state, Action::Ask(form.question)).await
}

async fn run_action(state: AppState, action: Action) -> Response {
    let request = {
        let mut session = state.session.lock().await;
        match session.begin(action) {
            Ok(request) => request,
            Err(AssistantError::Busy) => return conflict(&session),
            Err(e) => {
                session.set_notice(&e);
                return back_home();
            }
        }
    };

    // The call and its bookkeeping run on their own task, so a client that
    // disconnects mid-call cannot leave the session busy.
    let mode = request.mode();
    let task = tokio::spawn({
        let state = state.clone();
        async move {
            let outcome = state.assistant.analyze(&request).await;
            state.session.lock().await.complete(request.mode(), outcome);
        }
    });
    if let Err(e) = task.await {
        warn!("Analysis task failed: {e}");
        state
            .session
            .lock()
            .await
            .complete(mode, Err(AssistantError::Internal(format!("analysis task: {e}"))));
    }
    back_home()
}

/// JSON snapshot of the session.
pub async fn api_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(session.snapshot())
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Serve CSS.
pub async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], assets::CSS)
}

/// Serve the logo.
pub async fn serve_logo() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], assets::LOGO_SVG)
}
