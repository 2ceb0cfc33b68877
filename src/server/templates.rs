//! Askama template structs for the web interface.
//!
//! The page is rendered from a [`Session`] in one pass; everything the
//! template needs is flattened into plain fields here so the template
//! itself has no logic beyond `if`.

use askama::Template;

use crate::analysis::AnalysisMode;
use crate::session::{Session, SessionState};

pub const PAGE_TITLE: &str = "Netaş Denetim Rapor Analiz";
pub const HEADING: &str = "Denetim Rapor Analiz Asistanı 📊";
pub const SUBHEADING: &str = "Netaş R&D Innovation Group için özel arayüz";
pub const UPLOAD_PROMPT: &str = "📄 Rapor dosyanızı yükleyin veya sürükleyip bırakın.";
pub const ANALYZE_SPINNER: &str = "Rapor analiz ediliyor...";
pub const ASK_SPINNER: &str = "Yanıt aranıyor...";

/// The single application page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page_title: &'static str,
    pub heading: &'static str,
    pub subheading: &'static str,
    pub upload_prompt: &'static str,
    pub summary_value: &'static str,
    pub summary_label: &'static str,
    pub qa_value: &'static str,
    pub qa_label: &'static str,
    pub qa_selected: bool,
    pub file_name: String,
    pub has_document: bool,
    pub has_notice: bool,
    pub notice: String,
    pub has_result: bool,
    pub result_heading: &'static str,
    pub result_text: String,
    pub busy: bool,
    pub spinner_text: &'static str,
}

impl IndexTemplate {
    pub fn from_session(session: &Session) -> Self {
        let mode = session.mode();
        let result = session.result();
        let notice = session.notice();
        let spinner_text = match mode {
            AnalysisMode::SummaryAndActions => ANALYZE_SPINNER,
            AnalysisMode::QuestionAnswering => ASK_SPINNER,
        };

        Self {
            page_title: PAGE_TITLE,
            heading: HEADING,
            subheading: SUBHEADING,
            upload_prompt: UPLOAD_PROMPT,
            summary_value: AnalysisMode::SummaryAndActions.form_value(),
            summary_label: AnalysisMode::SummaryAndActions.label(),
            qa_value: AnalysisMode::QuestionAnswering.form_value(),
            qa_label: AnalysisMode::QuestionAnswering.label(),
            qa_selected: mode == AnalysisMode::QuestionAnswering,
            file_name: session
                .document()
                .map(|d| d.file_name().to_string())
                .unwrap_or_default(),
            has_document: session.state() != SessionState::NoDocument,
            has_notice: notice.is_some(),
            notice: notice.map(|n| n.message.clone()).unwrap_or_default(),
            has_result: result.is_some(),
            result_heading: result
                .map(|r| r.mode.result_heading())
                .unwrap_or_default(),
            result_text: result.map(|r| r.text.clone()).unwrap_or_default(),
            busy: session.is_busy(),
            spinner_text,
        }
    }
}
