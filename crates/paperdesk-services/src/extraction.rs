//! Remote document-extraction client
//!
//! One call extracts one stored document. The remote service exposes a
//! type-specific endpoint per file kind; the client picks it from the
//! original filename's extension. Only `pdf` and `txt` have endpoints today
//! even though the upload layer also accepts `docx` and `doc` — calls for
//! those types return an error.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;

use paperdesk_core::models::{extension_of, ExtractionRequest};
use paperdesk_core::{AppError, IngestConfig};

/// External extraction service at its interface boundary. Stateless; one
/// call equals one document.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<(), AppError>;
}

/// HTTP implementation of [`DocumentExtractor`].
pub struct HttpExtractionClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpExtractionClient {
    pub fn new(config: &IngestConfig) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client for extraction service")?;

        Ok(Self {
            http_client,
            base_url: config.extraction_base_url.trim_end_matches('/').to_string(),
            api_key: config.extraction_api_key.clone(),
        })
    }

    /// Endpoint path for a filename, chosen by extension.
    fn endpoint_for(&self, filename: &str) -> Result<String, AppError> {
        let ext = extension_of(filename).unwrap_or_default();
        let path = match ext.as_str() {
            "pdf" => "/api/v1/extract/pdf",
            "txt" => "/api/v1/extract/text",
            other => {
                return Err(AppError::UnsupportedFileType(format!(
                    "No extraction endpoint for '{}' files",
                    other
                )))
            }
        };
        Ok(format!("{}{}", self.base_url, path))
    }
}

#[async_trait]
impl DocumentExtractor for HttpExtractionClient {
    #[tracing::instrument(skip(self), fields(document_id = request.document_id))]
    async fn extract(&self, request: &ExtractionRequest) -> Result<(), AppError> {
        let url = self.endpoint_for(&request.original_filename)?;

        let content = tokio::fs::read(&request.storage_path).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to read stored file {}: {}",
                request.storage_path, e
            ))
        })?;

        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(content).file_name(request.original_filename.clone()),
            )
            .text("document_id", request.document_id.to_string())
            .text("category", request.category.clone());

        let mut req = self.http_client.post(&url).multipart(form);
        if let Some(ref key) = self.api_key {
            req = req.header("x-api-key", key.clone());
        }

        let response = req
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("Extraction request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Extraction(format!(
                "Extraction service returned {}: {}",
                status, body
            )));
        }

        tracing::debug!(document_id = request.document_id, "Extraction completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpExtractionClient {
        let config = IngestConfig {
            extraction_base_url: "http://extractor.internal/".to_string(),
            ..IngestConfig::default()
        };
        HttpExtractionClient::new(&config).unwrap()
    }

    #[test]
    fn pdf_and_txt_dispatch_to_their_endpoints() {
        let c = client();
        assert_eq!(
            c.endpoint_for("report.pdf").unwrap(),
            "http://extractor.internal/api/v1/extract/pdf"
        );
        assert_eq!(
            c.endpoint_for("notes.TXT").unwrap(),
            "http://extractor.internal/api/v1/extract/text"
        );
    }

    #[test]
    fn docx_and_doc_are_rejected_by_the_client() {
        // The upload validator accepts these; the extraction service has no
        // endpoint for them yet.
        let c = client();
        assert!(matches!(
            c.endpoint_for("contract.docx"),
            Err(AppError::UnsupportedFileType(_))
        ));
        assert!(matches!(
            c.endpoint_for("memo.doc"),
            Err(AppError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let c = client();
        assert!(c.endpoint_for("README").is_err());
    }
}
