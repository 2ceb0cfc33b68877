//! PDF page text via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks for the whole parse. [`crate::pipeline::extract`] calls
//! [`PageTextSource::page_texts`] from `tokio::task::spawn_blocking`, so
//! nothing here is async.
//!
//! ## Library discovery
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one
//! 2. the directory of the running executable
//! 3. the current working directory
//! 4. the system library search path

use crate::error::AssistantError;
use crate::pipeline::extract::PageTextSource;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit pdfium library.
pub const PDFIUM_LIB_PATH_VAR: &str = "PDFIUM_LIB_PATH";

/// Production [`PageTextSource`] backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumPages {
    library: Option<PathBuf>,
}

impl PdfiumPages {
    /// Use an explicit library file or directory.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library: Some(path.into()),
        }
    }

    /// Honour `PDFIUM_LIB_PATH` when set, otherwise search the defaults.
    pub fn from_env() -> Self {
        match std::env::var(PDFIUM_LIB_PATH_VAR) {
            Ok(p) if !p.trim().is_empty() => Self::with_library(p),
            _ => Self::default(),
        }
    }

    fn bind(&self) -> Result<Pdfium, AssistantError> {
        let bindings = match &self.library {
            Some(path) => Pdfium::bind_to_library(library_file(path))
                .map_err(|e| AssistantError::PdfiumBindingFailed(format!("{}: {e:?}", path.display())))?,
            None => search_default_locations()?,
        };
        Ok(Pdfium::new(bindings))
    }
}

impl PageTextSource for PdfiumPages {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, AssistantError> {
        let pdfium = self.bind()?;
        let document =
            pdfium
                .load_pdf_from_file(path, None)
                .map_err(|e| AssistantError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: format!("{e:?}"),
                })?;

        let pages = document.pages();
        let mut texts = Vec::with_capacity(pages.len() as usize);
        for (index, page) in pages.iter().enumerate() {
            match page.text() {
                Ok(text) => texts.push(text.all()),
                Err(e) => {
                    warn!("Page {}: no extractable text ({e:?})", index + 1);
                    texts.push(String::new());
                }
            }
        }
        debug!("Read text from {} pages of {}", texts.len(), path.display());
        Ok(texts)
    }
}

/// A directory means "the platform library inside it".
fn library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

fn search_default_locations() -> Result<Box<dyn PdfiumLibraryBindings>, AssistantError> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(&dir));
    }
    candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));

    for candidate in &candidates {
        if let Ok(bindings) = Pdfium::bind_to_library(candidate) {
            debug!("Bound pdfium from {}", candidate.display());
            return Ok(bindings);
        }
    }

    Pdfium::bind_to_system_library().map_err(|e| {
        AssistantError::PdfiumBindingFailed(format!(
            "not found in {:?} or on the system path: {e:?}",
            candidates
        ))
    })
}
