//! Submitter identity extractor.
//!
//! Session/JWT authentication is an upstream concern; by the time a request
//! reaches this service the gateway has resolved the session and forwards
//! the submitter identity in headers. The identity is not re-validated here.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use paperdesk_core::AppError;

use crate::error::HttpAppError;

pub const SUBMITTER_NAME_HEADER: &str = "x-submitter-name";
pub const SUBMITTER_TEAM_HEADER: &str = "x-submitter-team";

#[derive(Debug, Clone)]
pub struct SubmitterContext {
    pub name: String,
    pub team: String,
}

fn required_header(parts: &Parts, header: &str) -> Result<String, AppError> {
    parts
        .headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing {} header", header)))
}

impl<S> FromRequestParts<S> for SubmitterContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SubmitterContext {
            name: required_header(parts, SUBMITTER_NAME_HEADER)?,
            team: required_header(parts, SUBMITTER_TEAM_HEADER)?,
        })
    }
}
