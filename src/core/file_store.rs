// src/core/file_store.rs
//! Single-slot holder for the currently selected résumé

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub(crate) const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a résumé from disk. The type is guessed from the extension and
    /// never rejected.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume")
            .to_string();
        let mime = content_type_for(&file_name);

        Ok(Self::new(file_name, mime, bytes))
    }
}

/// Get content type for file
pub fn content_type_for(file_name: &str) -> &'static str {
    let lower_name = file_name.to_lowercase();
    if lower_name.ends_with(".pdf") {
        PDF_MIME
    } else if lower_name.ends_with(".docx") {
        DOCX_MIME
    } else {
        FALLBACK_MIME
    }
}

/// Holds at most one [`ResumeFile`]. Each selection replaces the previous one.
pub struct FileHandleStore {
    slot: watch::Sender<Option<Arc<ResumeFile>>>,
}

impl Default for FileHandleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandleStore {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    pub fn set_file(&self, candidate: ResumeFile) {
        debug!(
            "Selected resume {} ({}, {} bytes)",
            candidate.file_name,
            candidate.mime,
            candidate.bytes.len()
        );
        self.slot.send_replace(Some(Arc::new(candidate)));
    }

    pub fn get_file(&self) -> Option<Arc<ResumeFile>> {
        self.slot.borrow().clone()
    }

    pub fn clear(&self) {
        self.slot.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<ResumeFile>>> {
        self.slot.subscribe()
    }
}
