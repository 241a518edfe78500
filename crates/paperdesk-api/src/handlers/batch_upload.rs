use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use paperdesk_core::models::{BatchParams, BatchSubmitResponse};

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{parse_upload_form, submitter::SubmitterContext};
use crate::state::AppState;

/// Submit a batch of documents for ingestion. Returns the batch ID
/// immediately; per-file outcomes are only discoverable by polling the
/// status endpoint.
#[utoipa::path(
    post,
    path = "/api/v0/documents/batch",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 202, description = "Batch accepted", body = BatchSubmitResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Batch setup failed", body = ErrorResponse)
    )
)]
pub async fn submit_batch(
    State(state): State<Arc<AppState>>,
    submitter: SubmitterContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = parse_upload_form(multipart).await?;

    let params = BatchParams {
        category: form.category,
        submitter_name: submitter.name,
        submitter_team: submitter.team,
        auto_approve: form.auto_approve,
    };

    let batch_id = state.coordinator.run_batch(form.files, params).await?;

    Ok((StatusCode::ACCEPTED, Json(BatchSubmitResponse { batch_id })))
}
