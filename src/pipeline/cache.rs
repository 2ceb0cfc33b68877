//! Extraction memo keyed by file path.
//!
//! Extraction is idempotent for a given path, so results can be reused
//! without re-running pdfium. Two tasks racing on the same path both compute
//! the same text; whichever insert lands last wins and nothing observable
//! changes. Only successful extractions are stored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Thread-safe map from path to extracted text.
#[derive(Debug, Default)]
pub struct ExtractionCache {
    entries: RwLock<HashMap<PathBuf, Arc<str>>>,
}

impl ExtractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<str>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).cloned()
    }

    pub fn insert(&self, path: &Path, text: Arc<str>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(path.to_path_buf(), text);
    }

    /// Drop the entry for `path`, e.g. once its staged upload is deleted.
    pub fn remove(&self, path: &Path) -> Option<Arc<str>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
