//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; `AppError`
//! values convert into `HttpAppError` so every failure renders with the same
//! status mapping, body shape, and logging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use paperdesk_core::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper for AppError so IntoResponse can be implemented here (orphan
/// rules: both the trait and AppError are external to this crate).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let error = self.0;
        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %error, error_type = error.error_type(), "Request failed");
        } else {
            tracing::debug!(error = %error, error_type = error.error_type(), "Request rejected");
        }

        let body = ErrorResponse {
            error: error.to_string(),
            code: error.error_type().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        let resp = HttpAppError(AppError::NotFound("batch".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = HttpAppError(AppError::PayloadTooLarge("big".into())).into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let resp = HttpAppError(AppError::Storage("disk".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
