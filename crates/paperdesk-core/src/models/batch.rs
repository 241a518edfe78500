use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Key prefix for batch status snapshots in the status store.
pub const BATCH_STATUS_KEY_PREFIX: &str = "batch_status:";

/// Status value while a batch is still being processed.
pub const BATCH_STATUS_PROCESSING: &str = "processing";
/// Status value written with the final snapshot.
pub const BATCH_STATUS_COMPLETED: &str = "completed";

/// Status store key for a batch ID.
pub fn batch_status_key(batch_id: &str) -> String {
    format!("{}{}", BATCH_STATUS_KEY_PREFIX, batch_id)
}

/// Parameters shared by every file in a batch. Submitter identity comes from
/// the caller's authenticated session and is not re-validated here.
#[derive(Debug, Clone)]
pub struct BatchParams {
    pub category: String,
    pub submitter_name: String,
    pub submitter_team: String,
    pub auto_approve: bool,
}

/// Shared per-batch counters, guarded by a mutex in the coordinator.
///
/// Invariant: `processed == successful + failed` after every update, and
/// `processed` reaches `total` exactly once.
#[derive(Debug, Clone)]
pub struct BatchStats {
    pub batch_id: String,
    pub total: u64,
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub extracted: u64,
    pub auto_approve: bool,
}

impl BatchStats {
    pub fn new(batch_id: impl Into<String>, total: u64, auto_approve: bool) -> Self {
        Self {
            batch_id: batch_id.into(),
            total,
            processed: 0,
            successful: 0,
            failed: 0,
            extracted: 0,
            auto_approve,
        }
    }

    /// Record one file outcome. `extracted` counts persistence success under
    /// auto-approve, independent of the extraction call's own outcome.
    pub fn record(&mut self, success: bool, extracted: bool) {
        self.processed += 1;
        if success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        if extracted {
            self.extracted += 1;
        }
        debug_assert_eq!(self.processed, self.successful + self.failed);
    }

    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }

    /// Current counters as a status snapshot. The completion snapshot is the
    /// only one carrying `completed_at`.
    pub fn snapshot(&self, started_at: DateTime<Utc>) -> BatchStatusSnapshot {
        let completed = self.is_complete();
        BatchStatusSnapshot {
            total: self.total,
            processed: self.processed,
            successful: self.successful,
            failed: self.failed,
            extracted: self.extracted,
            status: if completed {
                BATCH_STATUS_COMPLETED.to_string()
            } else {
                BATCH_STATUS_PROCESSING.to_string()
            },
            auto_approve: self.auto_approve,
            started_at: Some(started_at),
            completed_at: completed.then(Utc::now),
        }
    }
}

/// JSON progress snapshot stored per batch ID with a fixed TTL. Written by
/// the coordinator, read by the status-polling endpoint. Not authoritative:
/// loss after TTL expiry is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchStatusSnapshot {
    pub total: u64,
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub extracted: u64,
    pub status: String,
    pub auto_approve: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Response for batch submission: processing continues in the background and
/// progress is only discoverable by polling the status endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchSubmitResponse {
    pub batch_id: String,
}
