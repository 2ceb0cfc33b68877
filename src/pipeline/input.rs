//! Upload staging: put uploaded bytes somewhere the extractor can open.
//!
//! pdfium opens documents from a file path, so every upload is written to a
//! fresh `TempDir`. The directory lives exactly as long as the
//! [`StagedUpload`] and is removed on drop, even on panic. File names and
//! magic bytes are validated here so the extractor only ever sees `.pdf` and
//! `.txt` files of the right shape.

use crate::document::{is_accepted_upload, ReportFormat};
use crate::error::AssistantError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// An upload written to a private temporary directory.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    format: ReportFormat,
    _temp_dir: TempDir,
}

impl StagedUpload {
    /// Path of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }
}

/// Check `file_name` and `bytes` without touching the file system.
///
/// Returns the sanitised file name and the inferred format.
///
/// # Errors
/// - [`AssistantError::UnsupportedFormat`] for anything but `.pdf` / `.txt`
/// - [`AssistantError::UploadTooLarge`] above `max_bytes`
/// - [`AssistantError::NotAPdf`] when a `.pdf` lacks the `%PDF` header
pub fn validate_upload(
    file_name: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(String, ReportFormat), AssistantError> {
    let safe_name = sanitize_file_name(file_name);
    if !is_accepted_upload(&safe_name) {
        return Err(AssistantError::UnsupportedFormat {
            file_name: file_name.to_string(),
        });
    }
    if bytes.len() > max_bytes {
        return Err(AssistantError::UploadTooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let format = ReportFormat::from_path(Path::new(&safe_name));
    if format == ReportFormat::Pdf {
        check_pdf_magic(Path::new(&safe_name), bytes)?;
    }
    Ok((safe_name, format))
}

/// Validate the upload, then write it to a fresh temp directory.
///
/// # Errors
/// Those of [`validate_upload`], plus [`AssistantError::Internal`] when the
/// temp file cannot be written.
pub async fn stage_upload(
    file_name: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<StagedUpload, AssistantError> {
    let (safe_name, format) = validate_upload(file_name, bytes, max_bytes)?;

    let temp_dir = TempDir::new().map_err(|e| AssistantError::Internal(format!("tempdir: {e}")))?;
    let path = temp_dir.path().join(&safe_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AssistantError::Internal(format!("Failed to write temp file: {e}")))?;

    debug!("Staged {} bytes at {}", bytes.len(), path.display());
    Ok(StagedUpload {
        path,
        format,
        _temp_dir: temp_dir,
    })
}

/// Read a local report for the one-shot CLI commands.
///
/// Returns the bare file name and the bytes, ready for [`validate_upload`].
pub async fn read_local(path: &Path) -> Result<(String, Vec<u8>), AssistantError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AssistantError::from_io(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((name, bytes))
}

/// Keep only the final path component; browsers may send full client paths.
fn sanitize_file_name(file_name: &str) -> String {
    let last = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    last.to_string()
}

fn check_pdf_magic(name: &Path, bytes: &[u8]) -> Result<(), AssistantError> {
    if bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(AssistantError::NotAPdf {
        path: name.to_path_buf(),
        magic,
    })
}
