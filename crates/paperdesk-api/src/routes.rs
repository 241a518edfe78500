//! Route table and middleware stack.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::handlers::{batch_status, batch_upload, document_detail, document_upload};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Multipart bodies can carry a whole batch; leave headroom above the
    // per-file cap.
    let body_limit = (state.config.max_file_size_bytes as usize).saturating_mul(2);

    Router::new()
        .route("/api/v0/documents", post(document_upload::upload_document))
        .route(
            "/api/v0/documents/{document_id}",
            get(document_detail::get_document),
        )
        .route(
            "/api/v0/documents/batch",
            post(batch_upload::submit_batch),
        )
        .route(
            "/api/v0/documents/batch/{batch_id}/status",
            get(batch_status::batch_status),
        )
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness plus an advisory view of the extraction queue.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "extraction_queue_depth": state.processor.queue_depth(),
    }))
}
