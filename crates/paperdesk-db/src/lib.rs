//! Database repositories for the data access layer
//!
//! Repositories execute parameterized statements against Postgres and map
//! rows to domain models. The [`DocumentWriter`] trait is the persistence
//! seam the batch coordinator writes through.

pub mod document;

pub use document::{DocumentReader, DocumentRepository, DocumentWriter};
