use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file received from the client, held in memory until it is written to
/// the upload directory or rejected.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub size: u64,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: Bytes) -> Self {
        let size = content.len() as u64;
        Self {
            filename: filename.into(),
            size,
            content,
        }
    }

    /// Lowercased extension of the original filename, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.filename)
    }
}

/// Lowercased extension of `filename` (without the dot). `None` when there
/// is no dot or nothing after it.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// What the extraction service needs to process one stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub document_id: i64,
    pub category: String,
    pub original_filename: String,
    pub storage_path: String,
}

/// A queued unit of extraction work. Transient and in-memory only: jobs are
/// consumed by exactly one worker and are not persisted across restarts.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub detail_id: i64,
    pub request: ExtractionRequest,
}
