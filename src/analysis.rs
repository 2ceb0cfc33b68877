//! Analysis dispatcher: one report, one mode, one completion call.
//!
//! ## Why a request type?
//!
//! [`AnalysisRequest`] is built immediately before dispatch and cannot hold
//! an empty question, so "Q&A without a question" is rejected before any
//! network traffic. The report text is a [`ReportText`], which already rules
//! out empty extractions.
//!
//! Both modes send exactly two messages (system persona, user instruction
//! with the report embedded) with the configured sampling and output
//! ceiling. Nothing is retried; the first choice's content is returned
//! trimmed of surrounding whitespace.

use crate::client::{ChatTurn, CompletionRequest, LazyClient};
use crate::config::AssistantConfig;
use crate::document::ReportText;
use crate::error::AssistantError;
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The two things the assistant can do with a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Three-item summary, two critical problems, three action proposals.
    #[default]
    SummaryAndActions,
    /// Free-form question answered from the report.
    QuestionAnswering,
}

impl AnalysisMode {
    /// Label shown on the mode selector.
    pub fn label(self) -> &'static str {
        match self {
            AnalysisMode::SummaryAndActions => "Özet + Aksiyon",
            AnalysisMode::QuestionAnswering => "Soru‑Cevap",
        }
    }

    /// Stable form value, the inverse of [`AnalysisMode::from_form_value`].
    pub fn form_value(self) -> &'static str {
        match self {
            AnalysisMode::SummaryAndActions => "summary",
            AnalysisMode::QuestionAnswering => "qa",
        }
    }

    /// Parse a form value; the selector label is accepted as well.
    pub fn from_form_value(value: &str) -> Option<Self> {
        let value = value.trim();
        [AnalysisMode::SummaryAndActions, AnalysisMode::QuestionAnswering]
            .into_iter()
            .find(|m| value == m.form_value() || value == m.label())
    }

    /// Label of the read-only result area for this mode.
    pub fn result_heading(self) -> &'static str {
        match self {
            AnalysisMode::SummaryAndActions => "GPT‑4 Özet & Aksiyonlar",
            AnalysisMode::QuestionAnswering => "Cevap",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully validated analysis, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    mode: AnalysisMode,
    text: ReportText,
    question: Option<String>,
}

impl AnalysisRequest {
    pub fn summary(text: ReportText) -> Self {
        Self {
            mode: AnalysisMode::SummaryAndActions,
            text,
            question: None,
        }
    }

    /// Question answering over `text`.
    ///
    /// # Errors
    /// [`AssistantError::EmptyQuestion`] when `question` is blank.
    pub fn question(text: ReportText, question: &str) -> Result<Self, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }
        Ok(Self {
            mode: AnalysisMode::QuestionAnswering,
            text,
            question: Some(question.to_string()),
        })
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn text(&self) -> &ReportText {
        &self.text
    }

    pub fn question_text(&self) -> Option<&str> {
        self.question.as_deref()
    }

    /// The wire-independent completion call for this request.
    pub fn to_completion(&self, config: &AssistantConfig) -> CompletionRequest {
        let language = &config.response_language;
        let (system, user, max_tokens) = match (&self.mode, &self.question) {
            (AnalysisMode::QuestionAnswering, Some(q)) => (
                prompts::assistant_system_prompt(language),
                prompts::question_user_prompt(self.text.as_str(), q),
                config.answer_max_tokens,
            ),
            _ => (
                prompts::auditor_system_prompt(language),
                prompts::summary_user_prompt(self.text.as_str()),
                config.summary_max_tokens,
            ),
        };
        CompletionRequest {
            messages: vec![ChatTurn::system(system), ChatTurn::user(user)],
            max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// Sends analysis requests to the configured completion service.
#[derive(Debug, Clone)]
pub struct Analyzer {
    client: Arc<LazyClient>,
    config: AssistantConfig,
}

impl Analyzer {
    pub fn new(client: Arc<LazyClient>, config: AssistantConfig) -> Self {
        Self { client, config }
    }

    /// Analyzer with a lazily built client for `config.backend`.
    pub fn from_config(config: AssistantConfig) -> Self {
        let client = Arc::new(LazyClient::from_config(&config));
        Self::new(client, config)
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Summary, critical problems and action proposals for `text`.
    pub async fn summarize(&self, text: &ReportText) -> Result<String, AssistantError> {
        self.run(&AnalysisRequest::summary(text.clone())).await
    }

    /// Answer `question` from `text`.
    pub async fn ask(&self, text: &ReportText, question: &str) -> Result<String, AssistantError> {
        let request = AnalysisRequest::question(text.clone(), question)?;
        self.run(&request).await
    }

    /// Dispatch `request` as exactly one completion call.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<String, AssistantError> {
        let client = self.client.get()?;
        let completion = request.to_completion(&self.config);

        info!(
            "Running '{}' via {} ({} report chars)",
            request.mode().form_value(),
            client.name(),
            request.text().as_str().chars().count()
        );
        let started = Instant::now();
        let result = client.complete(&completion).await;
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok(content) => {
                let content = content.trim().to_string();
                debug!("Completion returned {} chars in {elapsed_ms}ms", content.len());
                Ok(content)
            }
            Err(e) => {
                warn!("Analysis failed after {elapsed_ms}ms: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatCompletion;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed reply.
    struct Recording {
        reply: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl ChatCompletion for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, AssistantError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn analyzer(reply: &str) -> (Analyzer, Arc<Recording>) {
        let recording = Arc::new(Recording {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let client = Arc::new(LazyClient::ready(recording.clone()));
        (Analyzer::new(client, AssistantConfig::default()), recording)
    }

    fn text(s: &str) -> ReportText {
        ReportText::new(s).unwrap()
    }

    #[test]
    fn mode_form_values_round_trip() {
        for mode in [AnalysisMode::SummaryAndActions, AnalysisMode::QuestionAnswering] {
            assert_eq!(AnalysisMode::from_form_value(mode.form_value()), Some(mode));
            assert_eq!(AnalysisMode::from_form_value(mode.label()), Some(mode));
        }
        assert_eq!(AnalysisMode::from_form_value("translate"), None);
    }

    #[test]
    fn blank_question_cannot_be_built() {
        let err = AnalysisRequest::question(text("report"), "  \n").unwrap_err();
        assert!(matches!(err, AssistantError::EmptyQuestion));
    }

    #[tokio::test]
    async fn summary_sends_one_request_with_report_and_trims() {
        let (analyzer, recording) = analyzer("  Özet: ... ");
        let out = analyzer.summarize(&text("Satisfactory")).await.unwrap();
        assert_eq!(out, "Özet: ...");

        let seen = recording.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let req = &seen[0];
        assert_eq!(req.messages.len(), 2);
        assert!(req.system_content().contains("ISO 9001 Lead Auditor"));
        assert!(req.user_content().contains("Satisfactory"));
        assert!(req.user_content().contains("3 aksiyon önerisi"));
        assert_eq!(req.max_tokens, 800);
        assert_eq!(req.temperature, 0.0);
        assert_eq!(req.top_p, 1.0);
    }

    #[tokio::test]
    async fn question_sends_report_and_question() {
        let (analyzer, recording) = analyzer("\nEvet.\n");
        let out = analyzer
            .ask(&text("Line 3 is out of tolerance"), "Hangi hat sorunlu?")
            .await
            .unwrap();
        assert_eq!(out, "Evet.");

        let seen = recording.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let req = &seen[0];
        assert_eq!(req.max_tokens, 600);
        assert_eq!(
            req.user_content(),
            "Rapor:\n\nLine 3 is out of tolerance\n\nSORU: Hangi hat sorunlu?"
        );
        assert!(req.system_content().starts_with("You are a helpful assistant"));
    }

    #[tokio::test]
    async fn empty_question_issues_no_request() {
        let (analyzer, recording) = analyzer("unused");
        let err = analyzer.ask(&text("report"), "").await.unwrap_err();
        assert!(matches!(err, AssistantError::EmptyQuestion));
        assert!(recording.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_configuration_reaches_the_caller() {
        let client = Arc::new(LazyClient::with_factory(|| {
            Err(AssistantError::ConfigurationMissing {
                variable: "AZURE_OPENAI_ENDPOINT".into(),
                hint: String::new(),
            })
        }));
        let analyzer = Analyzer::new(client, AssistantConfig::default());
        let err = analyzer.summarize(&text("report")).await.unwrap_err();
        assert!(matches!(err, AssistantError::ConfigurationMissing { .. }));
    }

    #[test]
    fn language_flows_into_personas() {
        let config = AssistantConfig::builder()
            .response_language("English")
            .build()
            .unwrap();
        let req = AnalysisRequest::summary(text("r")).to_completion(&config);
        assert!(req.system_content().ends_with("in English."));
    }
}
