//! Batch ingestion coordinator.
//!
//! Ingests a batch of uploaded files with bounded parallelism: a fixed-size
//! worker pool drains a shared channel, so concurrent disk/DB load is capped
//! regardless of batch size. Per-file failures are isolated; only a setup
//! failure (upload directory creation) aborts a batch, and only before any
//! worker starts. Progress is flushed to the status store every Nth
//! processed file and unconditionally at completion.
//!
//! There is no caller-initiated abort: once a batch is dispatched, every
//! file is processed to completion.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use paperdesk_core::models::{
    batch_status_key, BatchParams, BatchStats, DetailStatus, DocumentUploadResponse,
    ExtractionJob, ExtractionRequest, NewDocumentDetail, UploadedFile,
};
use paperdesk_core::{AppError, IngestConfig};
use paperdesk_db::DocumentWriter;
use paperdesk_services::{DocumentExtractor, StatusStore};

/// A file that made it through validation, disk write, and both inserts.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub document_id: i64,
    pub detail_id: i64,
    pub stored_filename: String,
    pub storage_path: PathBuf,
    pub data_type: String,
    pub status: Option<DetailStatus>,
    pub created_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Extraction job for this document; used by the single-upload path to
    /// hand work to the async processor.
    pub fn extraction_job(&self, category: &str, original_filename: &str) -> ExtractionJob {
        ExtractionJob {
            detail_id: self.detail_id,
            request: ExtractionRequest {
                document_id: self.document_id,
                category: category.to_string(),
                original_filename: original_filename.to_string(),
                storage_path: self.storage_path.to_string_lossy().into_owned(),
            },
        }
    }
}

/// Outcome of one file within a batch. `extracted` reflects persistence
/// success under auto-approve, not the extraction call's result.
struct FileOutcome {
    success: bool,
    extracted: bool,
}

#[derive(Clone)]
pub struct BatchCoordinator {
    writer: Arc<dyn DocumentWriter>,
    extractor: Arc<dyn DocumentExtractor>,
    status_store: Arc<dyn StatusStore>,
    config: IngestConfig,
}

impl BatchCoordinator {
    pub fn new(
        writer: Arc<dyn DocumentWriter>,
        extractor: Arc<dyn DocumentExtractor>,
        status_store: Arc<dyn StatusStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            writer,
            extractor,
            status_store,
            config,
        }
    }

    /// Ingest a batch of files. Returns the batch ID immediately; processing
    /// continues in the background and progress is only discoverable through
    /// the status store.
    ///
    /// Fails synchronously when the file set or category is empty, or when
    /// the upload directory cannot be created (setup failure: nothing is
    /// processed).
    pub async fn run_batch(
        &self,
        files: Vec<UploadedFile>,
        params: BatchParams,
    ) -> Result<String, AppError> {
        if files.is_empty() {
            return Err(AppError::InvalidInput("No files in batch".to_string()));
        }
        if params.category.trim().is_empty() {
            return Err(AppError::InvalidInput("Category must not be empty".to_string()));
        }

        tokio::fs::create_dir_all(&self.config.upload_dir)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to create upload directory {}: {}",
                    self.config.upload_dir.display(),
                    e
                ))
            })?;

        let batch_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let total = files.len() as u64;

        tracing::info!(
            batch_id = %batch_id,
            total = total,
            auto_approve = params.auto_approve,
            workers = self.config.batch_workers,
            "Batch ingestion started"
        );

        let stats = BatchStats::new(batch_id.clone(), total, params.auto_approve);
        // First snapshot marks the batch as processing; the polling endpoint
        // recovers started_at from it.
        self.publish_snapshot(&batch_id, &stats.snapshot(started_at))
            .await;

        let this = self.clone();
        let id = batch_id.clone();
        tokio::spawn(async move {
            this.dispatch(id, files, params, started_at).await;
        });

        Ok(batch_id)
    }

    /// Fan the files out over the worker pool and wait for all of them.
    async fn dispatch(
        &self,
        batch_id: String,
        files: Vec<UploadedFile>,
        params: BatchParams,
        started_at: DateTime<Utc>,
    ) {
        let total = files.len() as u64;
        let stats = Arc::new(Mutex::new(BatchStats::new(
            batch_id.clone(),
            total,
            params.auto_approve,
        )));
        let params = Arc::new(params);

        let (tx, rx) = mpsc::channel::<UploadedFile>(files.len());
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = Vec::with_capacity(self.config.batch_workers);
        for worker_id in 0..self.config.batch_workers {
            let this = self.clone();
            let rx = rx.clone();
            let stats = stats.clone();
            let params = params.clone();
            let batch_id = batch_id.clone();
            workers.push(tokio::spawn(async move {
                // Pull files until the channel is drained, then exit.
                loop {
                    let file = { rx.lock().await.recv().await };
                    let Some(file) = file else { break };

                    let outcome = this.process_file(&batch_id, worker_id, &file, &params).await;
                    this.record_outcome(&batch_id, &stats, started_at, outcome)
                        .await;
                }
            }));
        }

        for file in files {
            // Receivers only close after this sender is dropped.
            if tx.send(file).await.is_err() {
                break;
            }
        }
        drop(tx);

        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!(batch_id = %batch_id, error = %e, "Batch worker panicked");
            }
        }

        tracing::info!(batch_id = %batch_id, total = total, "Batch ingestion finished");
    }

    /// Validate, persist, and (for auto-approved batches) inline-extract one
    /// file, reporting its outcome for aggregation.
    async fn process_file(
        &self,
        batch_id: &str,
        worker_id: usize,
        file: &UploadedFile,
        params: &BatchParams,
    ) -> FileOutcome {
        match self.store_file(file, params).await {
            Ok(stored) => {
                // Literal counter behavior: persistence success under
                // auto-approve counts as extracted, whatever the call below
                // returns.
                let extracted = params.auto_approve
                    && stored.document_id > 0
                    && stored.detail_id > 0;

                if params.auto_approve {
                    let job = stored.extraction_job(&params.category, &file.filename);
                    if let Err(e) = self.extractor.extract(&job.request).await {
                        // Extraction is an enhancement, not a correctness
                        // requirement of ingestion: the document is already
                        // durably stored.
                        tracing::error!(
                            batch_id = %batch_id,
                            worker_id = worker_id,
                            filename = %file.filename,
                            document_id = stored.document_id,
                            error = %e,
                            "Inline extraction failed"
                        );
                    }
                }

                FileOutcome {
                    success: true,
                    extracted,
                }
            }
            Err(e) => {
                tracing::warn!(
                    batch_id = %batch_id,
                    worker_id = worker_id,
                    filename = %file.filename,
                    error = %e,
                    "File rejected"
                );
                FileOutcome {
                    success: false,
                    extracted: false,
                }
            }
        }
    }

    /// The per-file pipeline shared by the batch and single-upload paths:
    /// size cap, extension allow-list, unique stored filename, disk write,
    /// then Document + DocumentDetail inserts with a best-effort compensating
    /// file delete when an insert fails.
    pub async fn store_file(
        &self,
        file: &UploadedFile,
        params: &BatchParams,
    ) -> Result<StoredDocument, AppError> {
        if file.size > self.config.max_file_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{} is {} bytes, maximum is {}",
                file.filename, file.size, self.config.max_file_size_bytes
            )));
        }

        let ext = file
            .extension()
            .filter(|e| self.config.extension_allowed(e))
            .ok_or_else(|| {
                AppError::UnsupportedFileType(format!(
                    "{}: allowed types are {}",
                    file.filename,
                    self.config.allowed_extensions.join(", ")
                ))
            })?;

        let stored_filename = stored_filename_for(&ext);
        let storage_path = self.config.upload_dir.join(&stored_filename);

        tokio::fs::write(&storage_path, &file.content)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to write {}: {}",
                    storage_path.display(),
                    e
                ))
            })?;

        let (status, is_approved) = if params.auto_approve {
            (Some(DetailStatus::Approved), Some(true))
        } else {
            (Some(DetailStatus::Pending), None)
        };

        let document_id = match self.writer.insert_document(&params.category).await {
            Ok(id) => id,
            Err(e) => {
                self.remove_stored_file(&storage_path).await;
                return Err(e);
            }
        };

        let detail = NewDocumentDetail {
            document_id,
            document_name: file.filename.clone(),
            stored_filename: stored_filename.clone(),
            data_type: ext.clone(),
            submitter_name: params.submitter_name.clone(),
            submitter_team: params.submitter_team.clone(),
            status,
            is_latest: true,
            is_approved,
        };

        let (detail_id, created_at) = match self.writer.insert_document_detail(&detail).await {
            Ok(result) => result,
            Err(e) => {
                // No transaction around the two inserts: the orphan document
                // row is an accepted inconsistency, the file is not.
                self.remove_stored_file(&storage_path).await;
                return Err(e);
            }
        };

        Ok(StoredDocument {
            document_id,
            detail_id,
            stored_filename,
            storage_path,
            data_type: ext,
            status,
            created_at,
        })
    }

    /// Single-file upload path. Stores the document and, under auto-approve,
    /// returns the extraction job for the caller to hand to the async
    /// processor instead of extracting inline.
    pub async fn ingest_one(
        &self,
        file: &UploadedFile,
        params: &BatchParams,
    ) -> Result<(DocumentUploadResponse, Option<ExtractionJob>), AppError> {
        tokio::fs::create_dir_all(&self.config.upload_dir)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to create upload directory {}: {}",
                    self.config.upload_dir.display(),
                    e
                ))
            })?;

        let stored = self.store_file(file, params).await?;
        let job = params
            .auto_approve
            .then(|| stored.extraction_job(&params.category, &file.filename));

        Ok((
            DocumentUploadResponse {
                document_id: stored.document_id,
                detail_id: stored.detail_id,
                filename: file.filename.clone(),
                stored_filename: stored.stored_filename,
                data_type: stored.data_type,
                status: stored.status,
                created_at: stored.created_at,
            },
            job,
        ))
    }

    /// Compensating delete after a failed insert; its own failure is logged
    /// and ignored.
    async fn remove_stored_file(&self, path: &PathBuf) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "Failed to remove file after DB error"
            );
        }
    }

    /// Update the shared counters and flush a snapshot when due. The counter
    /// update and the snapshot read share one critical section so the
    /// snapshot is never torn; the store write happens outside it.
    async fn record_outcome(
        &self,
        batch_id: &str,
        stats: &Arc<Mutex<BatchStats>>,
        started_at: DateTime<Utc>,
        outcome: FileOutcome,
    ) {
        let snapshot = {
            let mut stats = stats.lock().await;
            stats.record(outcome.success, outcome.extracted);
            let due =
                stats.processed % self.config.snapshot_every == 0 || stats.is_complete();
            due.then(|| stats.snapshot(started_at))
        };

        if let Some(snapshot) = snapshot {
            self.publish_snapshot(batch_id, &snapshot).await;
        }
    }

    async fn publish_snapshot(
        &self,
        batch_id: &str,
        snapshot: &paperdesk_core::models::BatchStatusSnapshot,
    ) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(batch_id = %batch_id, error = %e, "Failed to serialize snapshot");
                return;
            }
        };

        if let Err(e) = self
            .status_store
            .set(
                &batch_status_key(batch_id),
                &json,
                Duration::from_secs(self.config.status_ttl_secs),
            )
            .await
        {
            tracing::error!(batch_id = %batch_id, error = %e, "Failed to publish batch snapshot");
        }
    }
}

/// Collision-resistant stored filename: millisecond timestamp plus a random
/// identifier, preserving the (already lowercased) extension.
fn stored_filename_for(extension: &str) -> String {
    format!(
        "{}_{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    )
}
