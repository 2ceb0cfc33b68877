//! Report data model.
//!
//! A [`ReportDocument`] can only be built from a non-empty [`ReportText`], so
//! "we have a document" and "we have something worth sending to the model"
//! are the same fact. An empty extraction is the explicit
//! [`AssistantError::ExtractionEmpty`] instead of an empty string.

use crate::error::AssistantError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Extensions the upload control accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// Format of an uploaded report, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Text,
}

impl ReportFormat {
    /// `.pdf` (any case) is a PDF; everything else is read as UTF-8 text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => ReportFormat::Pdf,
            _ => ReportFormat::Text,
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Pdf => f.write_str("pdf"),
            ReportFormat::Text => f.write_str("text"),
        }
    }
}

/// Whether the upload control accepts a file with this name.
pub fn is_accepted_upload(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|ok| ext.eq_ignore_ascii_case(ok))
        })
}

/// Extracted report text that is guaranteed to contain a non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportText(String);

impl ReportText {
    /// Wrap `text`, or `None` when it is empty or whitespace only.
    ///
    /// The text is kept exactly as extracted; nothing is trimmed.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ReportText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An uploaded report together with its extracted text.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    file_name: String,
    bytes: Vec<u8>,
    format: ReportFormat,
    text: ReportText,
}

impl ReportDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, text: ReportText) -> Self {
        let file_name = file_name.into();
        let format = ReportFormat::from_path(Path::new(&file_name));
        Self {
            file_name,
            bytes,
            format,
            text,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn text(&self) -> &ReportText {
        &self.text
    }
}

/// Upgrade raw extraction output to [`ReportText`], naming `path` on failure.
pub fn require_text(path: &Path, text: String) -> Result<ReportText, AssistantError> {
    ReportText::new(text).ok_or_else(|| AssistantError::ExtractionEmpty {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(ReportFormat::from_path(Path::new("a.pdf")), ReportFormat::Pdf);
        assert_eq!(ReportFormat::from_path(Path::new("A.PDF")), ReportFormat::Pdf);
        assert_eq!(ReportFormat::from_path(Path::new("a.txt")), ReportFormat::Text);
        assert_eq!(ReportFormat::from_path(Path::new("README")), ReportFormat::Text);
    }

    #[test]
    fn accepted_uploads() {
        assert!(is_accepted_upload("week-42.pdf"));
        assert!(is_accepted_upload("notes.TXT"));
        assert!(!is_accepted_upload("report.docx"));
        assert!(!is_accepted_upload("pdf"));
        assert!(!is_accepted_upload(""));
    }

    #[test]
    fn report_text_rejects_whitespace() {
        assert!(ReportText::new("").is_none());
        assert!(ReportText::new(" \n\t\n\n").is_none());
        let t = ReportText::new("  Satisfactory\n").unwrap();
        assert_eq!(t.as_str(), "  Satisfactory\n");
    }

    #[test]
    fn require_text_signals_extraction_empty() {
        let err = require_text(Path::new("/tmp/blank.pdf"), "\n\n".into()).unwrap_err();
        assert!(matches!(err, AssistantError::ExtractionEmpty { .. }));
    }

    #[test]
    fn document_infers_format_from_name() {
        let doc = ReportDocument::new(
            "weekly.pdf",
            b"%PDF-1.7".to_vec(),
            ReportText::new("x").unwrap(),
        );
        assert_eq!(doc.format(), ReportFormat::Pdf);
        assert_eq!(doc.bytes().len(), 8);
        assert_eq!(doc.file_name(), "weekly.pdf");
    }
}
