use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use paperdesk_core::models::DocumentDetail;
use paperdesk_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Latest revision detail for a document. Approval workflows downstream
/// update which revision is latest; ingestion only ever creates one.
#[utoipa::path(
    get,
    path = "/api/v0/documents/{document_id}",
    tag = "documents",
    params(("document_id" = i64, Path, description = "Document identifier")),
    responses(
        (status = 200, description = "Latest document detail", body = DocumentDetail),
        (status = 404, description = "Unknown document", body = ErrorResponse)
    )
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<i64>,
) -> Result<Json<DocumentDetail>, HttpAppError> {
    let detail = state
        .reader
        .get_latest_detail(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No document with id {}", document_id)))?;

    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use paperdesk_core::models::DetailStatus;
    use paperdesk_services::MemoryStatusStore;

    use crate::handlers::testing::{app_state, StubReader};

    fn detail(document_id: i64) -> DocumentDetail {
        DocumentDetail {
            id: 11,
            document_id,
            document_name: "handbook.pdf".to_string(),
            stored_filename: "1693000000000_abc123.pdf".to_string(),
            data_type: "pdf".to_string(),
            submitter_name: "rita".to_string(),
            submitter_team: "support".to_string(),
            status: Some(DetailStatus::Pending),
            is_latest: true,
            is_approved: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn returns_the_latest_detail() {
        let state = app_state(
            Arc::new(MemoryStatusStore::new()),
            Arc::new(StubReader(Some(detail(7)))),
        );

        let Json(found) = get_document(State(state), Path(7)).await.unwrap();
        assert_eq!(found.document_id, 7);
        assert_eq!(found.document_name, "handbook.pdf");
        assert!(found.is_latest);
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let state = app_state(
            Arc::new(MemoryStatusStore::new()),
            Arc::new(StubReader(None)),
        );

        let err = get_document(State(state), Path(7)).await.unwrap_err();
        assert!(matches!(err.0, AppError::NotFound(_)));
    }
}
