//! Workflow tests: ingestion plus dispatch with in-process fakes.
//!
//! No pdfium library and no network are needed; PDF pages come from a
//! scripted [`PageTextSource`] and completions from a recording client.

use async_trait::async_trait;
use audit_assistant::{
    AnalysisRequest, Analyzer, Assistant, AssistantConfig, AssistantError, ChatCompletion,
    CompletionRequest, ErrorKind, LazyClient, PageTextSource, TextExtractor,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

// ── Fakes ────────────────────────────────────────────────────────────────────

struct ScriptedPages {
    pages: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedPages {
    fn new(pages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageTextSource for ScriptedPages {
    fn page_texts(&self, _path: &Path) -> Result<Vec<String>, AssistantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}

struct Recording {
    reply: String,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl Recording {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
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

fn assistant(pages: Arc<ScriptedPages>, client: Arc<Recording>) -> Assistant {
    Assistant::new(
        TextExtractor::new(pages),
        Analyzer::new(
            Arc::new(LazyClient::ready(client)),
            AssistantConfig::default(),
        ),
    )
}

fn write(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let p = dir.path().join(name);
    std::fs::write(&p, bytes).unwrap();
    p
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn satisfactory_text_report_is_summarised_and_trimmed() {
    let client = Recording::new("  Özet: ... ");
    let assistant = assistant(ScriptedPages::new(&[]), client.clone());

    let report = assert_ok!(assistant.ingest("report.txt", b"Satisfactory".to_vec()).await);
    assert_eq!(report.text().as_str(), "Satisfactory");

    let summary = assert_ok!(
        assistant
            .analyze(&AnalysisRequest::summary(report.text().clone()))
            .await
    );
    assert_eq!(summary, "Özet: ...");

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_content().contains("Satisfactory"));
    assert_eq!(requests[0].max_tokens, 800);
    assert_eq!(requests[0].temperature, 0.0);
    assert_eq!(requests[0].top_p, 1.0);
}

#[tokio::test]
async fn question_request_carries_question_and_text() {
    let client = Recording::new("Hat 3.");
    let assistant = assistant(ScriptedPages::new(&[]), client.clone());
    let report = assistant
        .ingest("week42.txt", "Hat 3: 4 uygunsuzluk".as_bytes().to_vec())
        .await
        .unwrap();

    let answer = assistant
        .analyzer()
        .ask(report.text(), "Hangi hat?")
        .await
        .unwrap();
    assert_eq!(answer, "Hat 3.");

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, 600);
    assert!(requests[0].user_content().contains("Hat 3: 4 uygunsuzluk"));
    assert!(requests[0].user_content().contains("SORU: Hangi hat?"));
}

#[tokio::test]
async fn pdf_pages_are_joined_in_order() {
    let client = Recording::new("ok");
    let pages = ScriptedPages::new(&["Page one", "Page two", "Page three"]);
    let assistant = assistant(pages, client);

    let report = assistant
        .ingest("week42.pdf", b"%PDF-1.7\n".to_vec())
        .await
        .unwrap();
    assert_eq!(
        report.text().as_str(),
        "Page one\n\nPage two\n\nPage three"
    );
}

#[tokio::test]
async fn empty_pdf_is_extraction_empty_and_never_dispatched() {
    for pages in [&[][..], &["", "  ", "\n"][..]] {
        let client = Recording::new("unused");
        let assistant = assistant(ScriptedPages::new(pages), client.clone());

        let err = assistant
            .ingest("scan.pdf", b"%PDF-1.4\n".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionEmpty, "pages {pages:?}");
        assert!(client.requests().is_empty());
    }
}

#[tokio::test]
async fn whitespace_text_file_is_extraction_empty() {
    let assistant = assistant(ScriptedPages::new(&[]), Recording::new("unused"));
    let err = assert_err!(assistant.ingest("blank.txt", b" \n\t\n".to_vec()).await);
    assert!(matches!(err, AssistantError::ExtractionEmpty { .. }));
}

#[tokio::test]
async fn local_file_extraction_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "week42.pdf", b"%PDF-1.7\n");
    let pages = ScriptedPages::new(&["A", "B"]);
    let assistant = assistant(pages.clone(), Recording::new("unused"));

    let first = assistant.ingest_path(&path).await.unwrap();
    let second = assistant.ingest_path(&path).await.unwrap();

    assert_eq!(first.text(), second.text());
    assert_eq!(first.file_name(), "week42.pdf");
    assert_eq!(pages.calls(), 1);
    assert_eq!(assistant.extractor().cache().len(), 1);
}

#[tokio::test]
async fn uploads_leave_nothing_in_the_cache() {
    let pages = ScriptedPages::new(&["A"]);
    let assistant = assistant(pages.clone(), Recording::new("unused"));

    for i in 0..5 {
        assert_ok!(assistant.ingest(&format!("week{i}.txt"), b"Satisfactory".to_vec()).await);
        assert_ok!(assistant.ingest("week.pdf", b"%PDF-1.7\n".to_vec()).await);
    }
    assert_err!(assistant.ingest("blank.txt", b"   ".to_vec()).await);

    assert!(assistant.extractor().cache().is_empty());
    assert_eq!(pages.calls(), 5);
}

#[tokio::test]
async fn unsupported_upload_is_rejected_before_extraction() {
    let pages = ScriptedPages::new(&["never"]);
    let assistant = assistant(pages.clone(), Recording::new("unused"));

    let err = assistant
        .ingest("report.docx", b"PK\x03\x04".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::UnsupportedFormat { .. }));
    assert_eq!(err.kind(), ErrorKind::Input);
    assert_eq!(pages.calls(), 0);
}

#[tokio::test]
async fn missing_credentials_only_fail_analysis() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    let lazy = LazyClient::with_factory(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(AssistantError::ConfigurationMissing {
            variable: "AZURE_OPENAI_KEY".into(),
            hint: "Set it in .env".into(),
        })
    });
    let assistant = Assistant::new(
        TextExtractor::new(ScriptedPages::new(&[])),
        Analyzer::new(Arc::new(lazy), AssistantConfig::default()),
    );

    let report = assistant
        .ingest("report.txt", b"Satisfactory".to_vec())
        .await
        .unwrap();
    assert_eq!(builds.load(Ordering::SeqCst), 0);

    let err = assistant
        .analyzer()
        .summarize(report.text())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);

    // Not cached: the next action tries again.
    let _ = assistant.analyzer().summarize(report.text()).await;
    assert_eq!(builds.load(Ordering::SeqCst), 2);
}
