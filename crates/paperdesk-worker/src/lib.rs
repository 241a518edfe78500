//! Batch ingestion and background extraction
//!
//! Two worker pools live here. [`BatchCoordinator`] ingests a batch of
//! uploaded files with bounded parallelism and publishes progress snapshots.
//! [`ExtractionProcessor`] decouples the remote extraction call from the
//! synchronous upload path via a bounded job queue with explicit
//! backpressure and cooperative shutdown.

pub mod coordinator;
pub mod processor;

pub use coordinator::BatchCoordinator;
pub use processor::{ExtractionProcessor, SubmitError};
