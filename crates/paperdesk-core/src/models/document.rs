use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Persistent document entity. Created exactly once per logical document;
/// the ingestion pipeline never updates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub category: String,
}

/// Review status of a document revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DetailStatus {
    Pending,
    Approved,
}

impl DetailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailStatus::Pending => "Pending",
            DetailStatus::Approved => "Approved",
        }
    }
}

impl std::fmt::Display for DetailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One revision of a document, one-to-many with [`Document`]. Exactly one
/// detail per document carries `is_latest = true` within the approval
/// workflow; at creation time it is always true.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentDetail {
    pub id: i64,
    pub document_id: i64,
    pub document_name: String,
    pub stored_filename: String,
    pub data_type: String,
    pub submitter_name: String,
    pub submitter_team: String,
    pub status: Option<DetailStatus>,
    pub is_latest: bool,
    pub is_approved: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new document detail; `id` and `created_at` are
/// assigned by the database.
#[derive(Debug, Clone)]
pub struct NewDocumentDetail {
    pub document_id: i64,
    pub document_name: String,
    pub stored_filename: String,
    pub data_type: String,
    pub submitter_name: String,
    pub submitter_team: String,
    pub status: Option<DetailStatus>,
    pub is_latest: bool,
    pub is_approved: Option<bool>,
}

/// Response envelope for the single-document upload endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentUploadResponse {
    pub document_id: i64,
    pub detail_id: i64,
    pub filename: String,
    pub stored_filename: String,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DetailStatus>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_status_strings() {
        assert_eq!(DetailStatus::Pending.as_str(), "Pending");
        assert_eq!(DetailStatus::Approved.as_str(), "Approved");
        assert_eq!(DetailStatus::Approved.to_string(), "Approved");
    }
}
