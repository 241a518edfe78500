//! Request handlers
//!
//! Thin layer only: multipart parsing and response envelopes. All ingestion
//! semantics live in paperdesk-worker.

pub mod batch_status;
pub mod batch_upload;
pub mod document_detail;
pub mod document_upload;
pub mod submitter;

use axum::extract::Multipart;

use paperdesk_core::models::UploadedFile;
use paperdesk_core::AppError;

/// Fields accepted by the upload endpoints.
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub category: String,
    pub auto_approve: bool,
}

/// Collect files and shared parameters from a multipart body. File parts are
/// named `files` (or `file` on the single-upload endpoint); `category` and
/// `auto_approve` are text parts.
pub async fn parse_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut files = Vec::new();
    let mut category = String::new();
    let mut auto_approve = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        AppError::InvalidInput("File part is missing a filename".to_string())
                    })?;
                let content = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file part: {}", e))
                })?;
                files.push(UploadedFile::new(filename, content));
            }
            "category" => {
                category = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read category: {}", e))
                })?;
            }
            "auto_approve" => {
                let text = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read auto_approve: {}", e))
                })?;
                auto_approve = matches!(text.trim(), "true" | "1");
            }
            // Unknown parts are ignored rather than rejected.
            _ => {}
        }
    }

    Ok(UploadForm {
        files,
        category,
        auto_approve,
    })
}

/// Stub collaborators for exercising handlers without a database, network,
/// or running batch.
#[cfg(test)]
pub mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use paperdesk_core::models::{DocumentDetail, ExtractionRequest, NewDocumentDetail};
    use paperdesk_core::{AppError, IngestConfig};
    use paperdesk_db::{DocumentReader, DocumentWriter};
    use paperdesk_services::{DocumentExtractor, StatusStore};
    use paperdesk_worker::{BatchCoordinator, ExtractionProcessor};

    use crate::state::AppState;

    pub struct StubWriter;

    #[async_trait]
    impl DocumentWriter for StubWriter {
        async fn insert_document(&self, _category: &str) -> Result<i64, AppError> {
            Ok(1)
        }

        async fn insert_document_detail(
            &self,
            _detail: &NewDocumentDetail,
        ) -> Result<(i64, DateTime<Utc>), AppError> {
            Ok((2, Utc::now()))
        }
    }

    pub struct StubExtractor;

    #[async_trait]
    impl DocumentExtractor for StubExtractor {
        async fn extract(&self, _request: &ExtractionRequest) -> Result<(), AppError> {
            Ok(())
        }
    }

    /// Reader that always answers with the wrapped detail.
    pub struct StubReader(pub Option<DocumentDetail>);

    #[async_trait]
    impl DocumentReader for StubReader {
        async fn get_latest_detail(
            &self,
            _document_id: i64,
        ) -> Result<Option<DocumentDetail>, AppError> {
            Ok(self.0.clone())
        }
    }

    pub fn app_state(
        store: Arc<dyn StatusStore>,
        reader: Arc<dyn DocumentReader>,
    ) -> Arc<AppState> {
        let extractor: Arc<dyn DocumentExtractor> = Arc::new(StubExtractor);
        let config = IngestConfig::default();
        Arc::new(AppState {
            coordinator: BatchCoordinator::new(
                Arc::new(StubWriter),
                extractor.clone(),
                store.clone(),
                config.clone(),
            ),
            processor: Arc::new(ExtractionProcessor::new(extractor, 1, 4)),
            status_store: store,
            reader,
            config,
        })
    }
}
