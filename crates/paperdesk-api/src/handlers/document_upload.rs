use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};

use paperdesk_core::models::{BatchParams, DocumentUploadResponse};
use paperdesk_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{parse_upload_form, submitter::SubmitterContext};
use crate::state::AppState;

/// Upload a single document. Under auto-approve, extraction is handed to the
/// background processor; a full queue or a shutdown in progress drops the
/// job with a log line and does not fail the upload — the stored document is
/// the caller-visible outcome.
#[utoipa::path(
    post,
    path = "/api/v0/documents",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document stored", body = DocumentUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    submitter: SubmitterContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = parse_upload_form(multipart).await?;

    let [file] = form.files.as_slice() else {
        return Err(AppError::InvalidInput(
            "Expected exactly one file part".to_string(),
        )
        .into());
    };

    let params = BatchParams {
        category: form.category,
        submitter_name: submitter.name,
        submitter_team: submitter.team,
        auto_approve: form.auto_approve,
    };

    if params.category.trim().is_empty() {
        return Err(AppError::InvalidInput("Category must not be empty".to_string()).into());
    }

    let (response, job) = state.coordinator.ingest_one(file, &params).await?;

    if let Some(job) = job {
        if let Err(e) = state.processor.submit(job) {
            tracing::warn!(
                document_id = response.document_id,
                error = %e,
                "Extraction job dropped"
            );
        }
    }

    Ok(Json(response))
}
