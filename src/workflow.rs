//! End-to-end workflow: report in, analysis out.
//!
//! [`Assistant`] ties ingestion and dispatch together and is what both the
//! web server and the CLI drive.
//!
//! ## Flow
//!
//! ```text
//! bytes ─► validate ─► stage (TempDir) ─► extract ─► ReportDocument
//!                                                       │
//!                           explicit user action ───────┤
//!                                                       ▼
//!                                  AnalysisRequest ─► one completion call
//! ```
//!
//! Ingestion never touches the completion client, so a missing credential
//! only surfaces once an analysis is requested.

use crate::analysis::{AnalysisRequest, Analyzer};
use crate::config::AssistantConfig;
use crate::document::ReportDocument;
use crate::error::AssistantError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::input::{read_local, stage_upload, validate_upload};
use std::path::Path;
use tracing::info;

/// Ingestion plus analysis behind one handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Assistant {
    extractor: TextExtractor,
    analyzer: Analyzer,
}

impl Assistant {
    pub fn new(extractor: TextExtractor, analyzer: Analyzer) -> Self {
        Self {
            extractor,
            analyzer,
        }
    }

    /// Production wiring: pdfium from the environment, lazily built client.
    pub fn from_config(config: AssistantConfig) -> Self {
        Self::new(TextExtractor::default(), Analyzer::from_config(config))
    }

    pub fn config(&self) -> &AssistantConfig {
        self.analyzer.config()
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Turn an uploaded file into a [`ReportDocument`].
    ///
    /// The bytes are staged in a temporary directory that is removed before
    /// this returns, and the extraction is not kept in the cache.
    ///
    /// # Errors
    /// Input errors from validation or extraction, and
    /// [`AssistantError::ExtractionEmpty`] when the report has no text.
    pub async fn ingest(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ReportDocument, AssistantError> {
        let staged = stage_upload(file_name, &bytes, self.config().max_upload_bytes).await?;
        let text = self.extractor.extract_report(staged.path()).await;
        // The staged path dies with `staged`; its entry would never hit again.
        self.extractor.cache().remove(staged.path());
        let text = text?;
        let name = staged
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        info!("Ingested '{name}' ({} chars)", text.as_str().chars().count());
        Ok(ReportDocument::new(name, bytes, text))
    }

    /// Turn a local file into a [`ReportDocument`] without copying it.
    ///
    /// Extraction is keyed by `path`, so repeated calls hit the cache.
    pub async fn ingest_path(&self, path: &Path) -> Result<ReportDocument, AssistantError> {
        let (name, bytes) = read_local(path).await?;
        let (name, _format) = validate_upload(&name, &bytes, self.config().max_upload_bytes)?;
        let text = self.extractor.extract_report(path).await?;
        info!("Ingested '{name}' ({} chars)", text.as_str().chars().count());
        Ok(ReportDocument::new(name, bytes, text))
    }

    /// Dispatch a validated request.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AssistantError> {
        self.analyzer.run(request).await
    }
}
