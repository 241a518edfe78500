//! Shared test doubles for the ingestion pipeline seams.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use paperdesk_core::models::{
    batch_status_key, BatchStatusSnapshot, ExtractionRequest, NewDocumentDetail,
    BATCH_STATUS_COMPLETED,
};
use paperdesk_core::AppError;
use paperdesk_db::DocumentWriter;
use paperdesk_services::{DocumentExtractor, MemoryStatusStore, StatusStore};

/// In-memory stand-in for the document repository.
#[derive(Default)]
pub struct MockWriter {
    next_id: AtomicI64,
    pub documents: Mutex<Vec<(i64, String)>>,
    pub details: Mutex<Vec<(i64, NewDocumentDetail)>>,
    pub fail_documents: AtomicBool,
    pub fail_details: AtomicBool,
}

impl MockWriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    pub fn failing_details() -> Arc<Self> {
        let writer = Self::new();
        writer.fail_details.store(true, Ordering::SeqCst);
        writer
    }
}

#[async_trait]
impl DocumentWriter for MockWriter {
    async fn insert_document(&self, category: &str) -> Result<i64, AppError> {
        if self.fail_documents.load(Ordering::SeqCst) {
            return Err(AppError::Internal("document insert failed".into()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.documents.lock().await.push((id, category.to_string()));
        Ok(id)
    }

    async fn insert_document_detail(
        &self,
        detail: &NewDocumentDetail,
    ) -> Result<(i64, DateTime<Utc>), AppError> {
        if self.fail_details.load(Ordering::SeqCst) {
            return Err(AppError::Internal("detail insert failed".into()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.details.lock().await.push((id, detail.clone()));
        Ok((id, Utc::now()))
    }
}

/// Counting extraction double; optionally always errors.
pub struct MockExtractor {
    pub calls: AtomicUsize,
    fail: bool,
}

impl MockExtractor {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentExtractor for MockExtractor {
    async fn extract(&self, _request: &ExtractionRequest) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(AppError::Extraction("extractor offline".into()))
        } else {
            Ok(())
        }
    }
}

/// Status store wrapper that counts writes.
#[derive(Clone)]
pub struct CountingStore {
    inner: MemoryStatusStore,
    pub writes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStatusStore::new(),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusStore for CountingStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.inner.get(key).await
    }
}

/// Poll the status store until the batch reports completion.
pub async fn wait_for_completion(
    store: &dyn StatusStore,
    batch_id: &str,
) -> BatchStatusSnapshot {
    for _ in 0..250 {
        if let Some(json) = store.get(&batch_status_key(batch_id)).await.unwrap() {
            let snapshot: BatchStatusSnapshot = serde_json::from_str(&json).unwrap();
            if snapshot.status == BATCH_STATUS_COMPLETED {
                return snapshot;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("batch {} did not complete in time", batch_id);
}
