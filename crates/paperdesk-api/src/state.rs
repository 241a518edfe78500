//! Application state shared by all handlers.

use std::sync::Arc;

use paperdesk_core::IngestConfig;
use paperdesk_db::DocumentReader;
use paperdesk_services::StatusStore;
use paperdesk_worker::{BatchCoordinator, ExtractionProcessor};

pub struct AppState {
    pub coordinator: BatchCoordinator,
    pub processor: Arc<ExtractionProcessor>,
    pub status_store: Arc<dyn StatusStore>,
    pub reader: Arc<dyn DocumentReader>,
    pub config: IngestConfig,
}
