//! Text extraction: one string per report, PDF or plain text.
//!
//! PDF pages are joined with a blank line in page order. A page pdfium cannot
//! read contributes an empty string instead of failing the document, so a
//! report with one damaged page still yields the rest of its text. Whether the
//! joined result is *usable* is decided one level up by
//! [`TextExtractor::extract_report`].

use crate::document::{require_text, ReportFormat, ReportText};
use crate::error::AssistantError;
use crate::pipeline::cache::ExtractionCache;
use crate::pipeline::pdf::PdfiumPages;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Separator placed between consecutive PDF pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Source of per-page PDF text.
///
/// Called from `spawn_blocking`; implementations may block.
pub trait PageTextSource: Send + Sync {
    /// Text of every page of the PDF at `path`, in page order.
    ///
    /// Pages without extractable text must be returned as `""`.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, AssistantError>;
}

/// Join page texts in order with [`PAGE_SEPARATOR`].
pub fn join_pages(pages: &[String]) -> String {
    pages.join(PAGE_SEPARATOR)
}

/// Extracts report text and memoises the result per path.
#[derive(Clone)]
pub struct TextExtractor {
    pages: Arc<dyn PageTextSource>,
    cache: Arc<ExtractionCache>,
}

impl std::fmt::Debug for TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextExtractor")
            .field("pages", &"<dyn PageTextSource>")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PdfiumPages::from_env()))
    }
}

impl TextExtractor {
    pub fn new(pages: Arc<dyn PageTextSource>) -> Self {
        Self {
            pages,
            cache: Arc::new(ExtractionCache::new()),
        }
    }

    /// The memo shared by clones of this extractor.
    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }

    /// Extract the text of the report at `path`, possibly empty.
    ///
    /// The format comes from the extension: `.pdf` goes through the page
    /// source, everything else is read as UTF-8.
    pub async fn extract_text(&self, path: &Path) -> Result<Arc<str>, AssistantError> {
        if let Some(hit) = self.cache.get(path) {
            debug!("Extraction cache hit: {}", path.display());
            return Ok(hit);
        }

        let text: Arc<str> = match ReportFormat::from_path(path) {
            ReportFormat::Pdf => {
                let pages = Arc::clone(&self.pages);
                let owned = path.to_path_buf();
                let texts = tokio::task::spawn_blocking(move || pages.page_texts(&owned))
                    .await
                    .map_err(|e| AssistantError::Internal(format!("PDF task panicked: {e}")))??;
                info!("Extracted {} pages from {}", texts.len(), path.display());
                Arc::from(join_pages(&texts))
            }
            ReportFormat::Text => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| AssistantError::from_io(path, e))?;
                Arc::from(text)
            }
        };

        self.cache.insert(path, Arc::clone(&text));
        Ok(text)
    }

    /// Extract and require usable text.
    ///
    /// # Errors
    /// [`AssistantError::ExtractionEmpty`] when the text is empty or
    /// whitespace only, in addition to the errors of [`Self::extract_text`].
    pub async fn extract_report(&self, path: &Path) -> Result<ReportText, AssistantError> {
        let text = self.extract_text(path).await?;
        require_text(path, text.to_string())
    }
}
