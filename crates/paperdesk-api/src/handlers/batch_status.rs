use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use paperdesk_core::models::{batch_status_key, BatchStatusSnapshot};
use paperdesk_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Latest progress snapshot for a batch. Snapshots expire with the store
/// TTL; an expired or unknown batch is a 404.
#[utoipa::path(
    get,
    path = "/api/v0/documents/batch/{batch_id}/status",
    tag = "documents",
    params(("batch_id" = String, Path, description = "Batch identifier")),
    responses(
        (status = 200, description = "Current batch status", body = BatchStatusSnapshot),
        (status = 404, description = "Unknown or expired batch", body = ErrorResponse)
    )
)]
pub async fn batch_status(
    State(state): State<Arc<AppState>>,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchStatusSnapshot>, HttpAppError> {
    let json = state
        .status_store
        .get(&batch_status_key(&batch_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No status for batch {}", batch_id)))?;

    let mut snapshot: BatchStatusSnapshot =
        serde_json::from_str(&json).map_err(AppError::from)?;
    // Best-effort: the first snapshot normally carries started_at, but an
    // older blob without one falls back to the current time.
    if snapshot.started_at.is_none() {
        snapshot.started_at = Some(Utc::now());
    }

    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use paperdesk_core::models::{batch_status_key, BATCH_STATUS_PROCESSING};
    use paperdesk_services::{MemoryStatusStore, StatusStore};

    use crate::handlers::testing::{app_state, StubReader};

    #[tokio::test]
    async fn unknown_batch_is_not_found() {
        let state = app_state(
            Arc::new(MemoryStatusStore::new()),
            Arc::new(StubReader(None)),
        );

        let err = batch_status(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err.0, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn stored_snapshot_is_deserialized_and_served() {
        let store = Arc::new(MemoryStatusStore::new());
        store
            .set(
                &batch_status_key("b1"),
                r#"{"total":3,"processed":1,"successful":1,"failed":0,"extracted":0,"status":"processing","auto_approve":false,"started_at":"2026-08-30T10:00:00Z"}"#,
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        let state = app_state(store, Arc::new(StubReader(None)));

        let Json(snapshot) = batch_status(State(state), Path("b1".to_string()))
            .await
            .unwrap();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.processed, 1);
        assert_eq!(snapshot.status, BATCH_STATUS_PROCESSING);
        assert!(snapshot.completed_at.is_none());
    }

    #[tokio::test]
    async fn missing_started_at_defaults_to_now() {
        let store = Arc::new(MemoryStatusStore::new());
        // Older blobs predate the started_at field.
        store
            .set(
                &batch_status_key("b2"),
                r#"{"total":1,"processed":0,"successful":0,"failed":0,"extracted":0,"status":"processing","auto_approve":true}"#,
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        let state = app_state(store, Arc::new(StubReader(None)));

        let Json(snapshot) = batch_status(State(state), Path("b2".to_string()))
            .await
            .unwrap();
        assert!(snapshot.started_at.is_some());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_an_internal_error() {
        let store = Arc::new(MemoryStatusStore::new());
        store
            .set(&batch_status_key("b3"), "not json", Duration::from_secs(60))
            .await
            .unwrap();
        let state = app_state(store, Arc::new(StubReader(None)));

        let err = batch_status(State(state), Path("b3".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err.0, AppError::Internal(_)));
    }
}
