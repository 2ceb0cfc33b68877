//! Error types for the audit-assistant library.
//!
//! Every failure is reported through one enum, [`AssistantError`], and every
//! variant belongs to exactly one [`ErrorKind`]. The kind is what the
//! presentation layer cares about: an empty document halts the workflow, a
//! missing credential disables analysis but not upload, and a remote failure
//! is shown next to the action that caused it while the session keeps its
//! previous result.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`AssistantError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The document produced no usable text.
    ExtractionEmpty,
    /// Credential, endpoint, or provider configuration is absent or invalid.
    ConfigurationMissing,
    /// The completion service could not be reached or answered badly.
    RemoteCallFailure,
    /// The uploaded file itself is unacceptable.
    Input,
    /// The action is not valid in the current session state.
    Workflow,
    /// A bug or an environment problem unrelated to the user's input.
    Internal,
}

/// All errors returned by the audit-assistant library.
#[derive(Debug, Error)]
pub enum AssistantError {
    // ── Extraction ────────────────────────────────────────────────────────
    /// Extraction succeeded but the text is empty or whitespace only.
    #[error(
        "No text could be extracted from '{path}'.\n\
         The PDF may be a scanned image or the file is empty."
    )]
    ExtractionEmpty { path: PathBuf },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Only `.pdf` and `.txt` reports are accepted.
    #[error("Unsupported report type '{file_name}': upload a .pdf or .txt file")]
    UnsupportedFormat { file_name: String },

    /// The upload form did not carry a file.
    #[error("No report file was attached to the upload")]
    MissingUpload,

    /// The multipart body could not be read.
    #[error("Upload could not be read: {0}")]
    MalformedUpload(String),

    /// The upload exceeds the configured size limit.
    #[error("Report is {size} bytes; the limit is {limit} bytes")]
    UploadTooLarge { size: usize, limit: usize },

    /// Input file was not found at the given path.
    #[error("Report file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// A `.txt` report is not valid UTF-8.
    #[error("Report '{path}' is not valid UTF-8 text")]
    NotUtf8 { path: PathBuf },

    /// A `.pdf` report does not start with the PDF magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// pdfium could not open the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    // ── Workflow errors ───────────────────────────────────────────────────
    /// Analysis was requested before a usable report was loaded.
    #[error("Upload a report before running an analysis")]
    NoDocument,

    /// Question mode was submitted without a question.
    #[error("Type a question before pressing Ask")]
    EmptyQuestion,

    /// An analysis is already in flight for this session.
    #[error("An analysis is already running; wait for it to finish")]
    Busy,

    // ── Configuration errors ──────────────────────────────────────────────
    /// A required environment variable is absent or empty.
    #[error("Configuration value '{variable}' is missing.\n{hint}")]
    ConfigurationMissing { variable: String, hint: String },

    /// The selected edgequake-llm provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The request never got an HTTP answer.
    #[error("Could not reach the completion service: {0}")]
    Connection(String),

    /// The completion call exceeded the client timeout.
    #[error("Completion call timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// HTTP 401/403 from the completion service.
    #[error("Authentication error from the completion service: {detail}")]
    AuthError { detail: String },

    /// HTTP 429 from the completion service.
    #[error("Rate limit exceeded by the completion service")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    /// Any other non-success answer.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The answer arrived but carried no usable message content.
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction from PDF reports needs the pdfium shared library.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory), or\n\
  • place libpdfium next to the executable, or\n\
  • install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssistantError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use AssistantError::*;
        match self {
            ExtractionEmpty { .. } => ErrorKind::ExtractionEmpty,
            UnsupportedFormat { .. }
            | MissingUpload
            | MalformedUpload(_)
            | UploadTooLarge { .. }
            | FileNotFound { .. }
            | PermissionDenied { .. }
            | NotUtf8 { .. }
            | NotAPdf { .. }
            | CorruptPdf { .. } => ErrorKind::Input,
            NoDocument | EmptyQuestion | Busy => ErrorKind::Workflow,
            ConfigurationMissing { .. } | ProviderNotConfigured { .. } | InvalidConfig(_) => {
                ErrorKind::ConfigurationMissing
            }
            Connection(_)
            | ApiTimeout { .. }
            | AuthError { .. }
            | RateLimitExceeded { .. }
            | LlmApiError { .. }
            | MalformedResponse(_) => ErrorKind::RemoteCallFailure,
            PdfiumBindingFailed(_) | Internal(_) => ErrorKind::Internal,
        }
    }

    /// Map an I/O error on `path` to the matching input error.
    pub(crate) fn from_io(path: impl Into<PathBuf>, e: std::io::Error) -> Self {
        let path = path.into();
        match e.kind() {
            std::io::ErrorKind::NotFound => AssistantError::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => AssistantError::PermissionDenied { path },
            std::io::ErrorKind::InvalidData => AssistantError::NotUtf8 { path },
            _ => AssistantError::Internal(format!("reading '{}': {e}", path.display())),
        }
    }
}
