//! Per-session state machine.
//!
//! ```text
//!               upload ok                  analysis ok
//! NoDocument ──────────────► DocumentLoaded ────────────► ResultDisplayed
//!     ▲                         │    ▲                         │
//!     │                         │    └─────── upload ok ───────┤
//!     └──── upload rejected ────┴──────────────────────────────┘
//! ```
//!
//! A failed analysis is not a transition: the state and the previous result
//! stay, only the notice changes.
//!
//! The state is derived from what the session holds, so it cannot disagree
//! with the data: no document means `NoDocument`, a document with a result
//! means `ResultDisplayed`. Every transition is a method call triggered by a
//! discrete user action; rendering never mutates the session.
//!
//! At most one analysis is in flight. [`Session::begin`] sets the busy flag
//! and [`Session::complete`] always clears it, whatever the outcome.

use crate::analysis::{AnalysisMode, AnalysisRequest};
use crate::document::{ReportDocument, ReportFormat};
use crate::error::{AssistantError, ErrorKind};
use serde::Serialize;
use tracing::{debug, info};

/// Shown when a report yields no text.
pub const EMPTY_EXTRACTION_NOTICE: &str =
    "❗Dosyadan metin alınamadı. PDF taranmış görüntü olabilir veya boş.";

/// Where the session is in the upload → analyse cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoDocument,
    DocumentLoaded,
    ResultDisplayed,
}

/// A user action that needs the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// "Analiz Et": summarize and recommend.
    Analyze,
    /// "Sor": answer the given question.
    Ask(String),
}

/// The text of the last successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub mode: AnalysisMode,
    pub text: String,
}

/// A message shown to the user next to the action that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

impl Notice {
    pub fn from_error(err: &AssistantError) -> Self {
        let message = match err {
            AssistantError::ExtractionEmpty { .. } => EMPTY_EXTRACTION_NOTICE.to_string(),
            other => format!("❗{other}"),
        };
        Self {
            kind: err.kind(),
            message,
        }
    }
}

/// One user's view of the assistant.
#[derive(Debug, Default)]
pub struct Session {
    document: Option<ReportDocument>,
    result: Option<AnalysisResult>,
    notice: Option<Notice>,
    mode: AnalysisMode,
    busy: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match (&self.document, &self.result) {
            (None, _) => SessionState::NoDocument,
            (Some(_), None) => SessionState::DocumentLoaded,
            (Some(_), Some(_)) => SessionState::ResultDisplayed,
        }
    }

    pub fn document(&self) -> Option<&ReportDocument> {
        self.document.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Fail with [`AssistantError::Busy`] while an analysis is in flight.
    pub fn ensure_idle(&self) -> Result<(), AssistantError> {
        if self.busy {
            Err(AssistantError::Busy)
        } else {
            Ok(())
        }
    }

    /// A new report replaces whatever was there; the old result goes with it.
    pub fn load_document(&mut self, document: ReportDocument) {
        info!(
            "Report loaded: {} ({}, {} bytes)",
            document.file_name(),
            document.format(),
            document.bytes().len()
        );
        self.document = Some(document);
        self.result = None;
        self.notice = None;
    }

    /// The upload failed: drop the previous report and show why.
    pub fn reject_upload(&mut self, err: &AssistantError) {
        debug!("Upload rejected: {err}");
        self.document = None;
        self.result = None;
        self.notice = Some(Notice::from_error(err));
    }

    /// Change the selected mode. Nothing else changes.
    pub fn select_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
    }

    /// Show `err` without changing state, e.g. for a rejected action.
    pub fn set_notice(&mut self, err: &AssistantError) {
        self.notice = Some(Notice::from_error(err));
    }

    /// Validate `action` and mark the session busy.
    ///
    /// # Errors
    /// [`AssistantError::Busy`], [`AssistantError::NoDocument`] or
    /// [`AssistantError::EmptyQuestion`], in that order. The session is left
    /// untouched on error.
    pub fn begin(&mut self, action: Action) -> Result<AnalysisRequest, AssistantError> {
        self.ensure_idle()?;
        let text = self
            .document
            .as_ref()
            .ok_or(AssistantError::NoDocument)?
            .text()
            .clone();
        let request = match action {
            Action::Analyze => AnalysisRequest::summary(text),
            Action::Ask(question) => AnalysisRequest::question(text, &question)?,
        };
        self.busy = true;
        Ok(request)
    }

    /// Record the outcome of the analysis started by [`Session::begin`].
    ///
    /// Success shows the new result. Failure keeps the previous result and
    /// sets the notice.
    pub fn complete(&mut self, mode: AnalysisMode, outcome: Result<String, AssistantError>) {
        self.busy = false;
        match outcome {
            Ok(text) => {
                self.result = Some(AnalysisResult { mode, text });
                self.notice = None;
            }
            Err(err) => self.notice = Some(Notice::from_error(&err)),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            mode: self.mode,
            file_name: self.document.as_ref().map(|d| d.file_name().to_string()),
            format: self.document.as_ref().map(ReportDocument::format),
            result: self.result.clone(),
            notice: self.notice.clone(),
            busy: self.busy,
        }
    }
}

/// Serializable view of a [`Session`], served as `/api/session`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub mode: AnalysisMode,
    pub file_name: Option<String>,
    pub format: Option<ReportFormat>,
    pub result: Option<AnalysisResult>,
    pub notice: Option<Notice>,
    pub busy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ReportText;

    fn doc(name: &str, text: &str) -> ReportDocument {
        ReportDocument::new(
            name,
            text.as_bytes().to_vec(),
            ReportText::new(text).unwrap(),
        )
    }

    fn loaded() -> Session {
        let mut s = Session::new();
        s.load_document(doc("report.txt", "Satisfactory"));
        s
    }

    #[test]
    fn starts_empty() {
        let s = Session::new();
        assert_eq!(s.state(), SessionState::NoDocument);
        assert_eq!(s.mode(), AnalysisMode::SummaryAndActions);
        assert!(!s.is_busy());
    }

    #[test]
    fn analyze_without_document_is_rejected_without_side_effects() {
        let mut s = Session::new();
        let err = s.begin(Action::Analyze).unwrap_err();
        assert!(matches!(err, AssistantError::NoDocument));
        assert!(!s.is_busy());
        assert!(s.notice().is_none());
    }

    #[test]
    fn successful_analysis_displays_result() {
        let mut s = loaded();
        assert_eq!(s.state(), SessionState::DocumentLoaded);

        let req = s.begin(Action::Analyze).unwrap();
        assert!(s.is_busy());
        s.complete(req.mode(), Ok("Özet: ...".into()));

        assert!(!s.is_busy());
        assert_eq!(s.state(), SessionState::ResultDisplayed);
        assert_eq!(s.result().unwrap().text, "Özet: ...");
    }

    #[test]
    fn failed_analysis_keeps_previous_result() {
        let mut s = loaded();
        s.begin(Action::Analyze).unwrap();
        s.complete(AnalysisMode::SummaryAndActions, Ok("first".into()));

        s.begin(Action::Ask("Neden?".into())).unwrap();
        s.complete(
            AnalysisMode::QuestionAnswering,
            Err(AssistantError::ApiTimeout { secs: 120 }),
        );

        assert!(!s.is_busy());
        assert_eq!(s.state(), SessionState::ResultDisplayed);
        assert_eq!(s.result().unwrap().text, "first");
        assert_eq!(s.notice().unwrap().kind, ErrorKind::RemoteCallFailure);
    }

    #[test]
    fn busy_session_rejects_second_submission() {
        let mut s = loaded();
        s.begin(Action::Analyze).unwrap();
        let err = s.begin(Action::Ask("x".into())).unwrap_err();
        assert!(matches!(err, AssistantError::Busy));
        assert!(s.is_busy());
    }

    #[test]
    fn empty_question_is_rejected_before_busy() {
        let mut s = loaded();
        let err = s.begin(Action::Ask("   ".into())).unwrap_err();
        assert!(matches!(err, AssistantError::EmptyQuestion));
        assert!(!s.is_busy());
    }

    #[test]
    fn mode_switch_changes_nothing_else() {
        let mut s = loaded();
        s.begin(Action::Analyze).unwrap();
        s.complete(AnalysisMode::SummaryAndActions, Ok("r".into()));

        s.select_mode(AnalysisMode::QuestionAnswering);
        assert_eq!(s.mode(), AnalysisMode::QuestionAnswering);
        assert_eq!(s.state(), SessionState::ResultDisplayed);
        assert_eq!(s.result().unwrap().text, "r");
    }

    #[test]
    fn new_upload_clears_result_and_rejection_clears_document() {
        let mut s = loaded();
        s.begin(Action::Analyze).unwrap();
        s.complete(AnalysisMode::SummaryAndActions, Ok("r".into()));

        s.load_document(doc("next.txt", "Other"));
        assert_eq!(s.state(), SessionState::DocumentLoaded);
        assert!(s.result().is_none());

        s.reject_upload(&AssistantError::ExtractionEmpty {
            path: "scan.pdf".into(),
        });
        assert_eq!(s.state(), SessionState::NoDocument);
        assert_eq!(s.notice().unwrap().message, EMPTY_EXTRACTION_NOTICE);
        assert_eq!(s.notice().unwrap().kind, ErrorKind::ExtractionEmpty);
    }

    #[test]
    fn snapshot_serializes_state_names() {
        let s = loaded();
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["state"], "document_loaded");
        assert_eq!(json["mode"], "summary_and_actions");
        assert_eq!(json["file_name"], "report.txt");
        assert_eq!(json["format"], "text");
        assert_eq!(json["busy"], false);
        assert!(json["result"].is_null());
    }
}
