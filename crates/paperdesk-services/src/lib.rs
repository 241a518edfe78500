//! Paperdesk service layer
//!
//! External collaborators of the ingestion pipeline, specified at their
//! interface boundary: the remote extraction service client and the batch
//! status store. Both are traits so the worker crate can be exercised
//! without a network or a cache server.

pub mod extraction;
pub mod status_store;

pub use extraction::{DocumentExtractor, HttpExtractionClient};
pub use status_store::{MemoryStatusStore, StatusStore};
