//! Data models for the ingestion pipeline
//!
//! Persistent entities (documents and their revision details), transient
//! upload/extraction types, and the per-batch progress accounting types.

mod batch;
mod document;
mod upload;

// Re-export all models for convenient imports
pub use batch::*;
pub use document::*;
pub use upload::*;
