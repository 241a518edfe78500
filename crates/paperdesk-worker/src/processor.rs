//! Async extraction processor: bounded job queue and worker pool.
//!
//! Decouples the latency and failure domain of the remote extraction call
//! from the upload request path. Jobs are fire-and-forget: each is attempted
//! exactly once, errors are logged and never surfaced to the submitter, and
//! nothing survives a process restart.
//!
//! Shutdown ordering matters: the cancellation token is signalled before the
//! channel is closed, so a worker blocked on receive wakes via whichever it
//! observes first. [`ExtractionProcessor::shutdown`] returns only after every
//! worker has exited; an in-flight extraction call is not interruptible, so
//! worst-case shutdown latency is the slowest in-flight call.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use paperdesk_core::models::ExtractionJob;
use paperdesk_services::DocumentExtractor;

/// Worker count used when the configured value is non-positive.
pub const DEFAULT_WORKERS: usize = 3;

/// Typed rejection returned by [`ExtractionProcessor::submit`]. The caller
/// decides whether to drop the job or fall back; the processor never blocks
/// the submitting thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("extraction queue is full")]
    QueueFull,
    #[error("extraction processor is shutting down")]
    ShuttingDown,
}

pub struct ExtractionProcessor {
    /// Dropped (set to `None`) on shutdown to close the channel. The same
    /// lock covers the shutdown check and the enqueue, so no job slips in
    /// after shutdown has begun.
    tx: StdMutex<Option<mpsc::Sender<ExtractionJob>>>,
    cancel: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ExtractionProcessor {
    /// Start `worker_count` workers (falls back to [`DEFAULT_WORKERS`] when
    /// zero) draining a channel of `queue_capacity` jobs.
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        worker_count: usize,
        queue_capacity: usize,
    ) -> Self {
        let worker_count = if worker_count > 0 {
            worker_count
        } else {
            DEFAULT_WORKERS
        };
        let (tx, rx) = mpsc::channel::<ExtractionJob>(queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let cancel = CancellationToken::new();

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let rx = rx.clone();
            let cancel = cancel.clone();
            let extractor = extractor.clone();
            workers.push(tokio::spawn(async move {
                Self::worker_loop(worker_id, rx, cancel, extractor).await;
            }));
        }

        tracing::info!(
            worker_count = worker_count,
            queue_capacity = queue_capacity.max(1),
            "Extraction processor started"
        );

        Self {
            tx: StdMutex::new(Some(tx)),
            cancel,
            workers: Mutex::new(workers),
        }
    }

    /// Enqueue a job without blocking. Fails fast with [`SubmitError::QueueFull`]
    /// when the buffer is saturated and [`SubmitError::ShuttingDown`] once
    /// shutdown has been initiated.
    pub fn submit(&self, job: ExtractionJob) -> Result<(), SubmitError> {
        let guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        let tx = guard.as_ref().ok_or(SubmitError::ShuttingDown)?;
        tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Extraction queue is full, rejecting job");
                SubmitError::QueueFull
            }
            mpsc::error::TrySendError::Closed(_) => SubmitError::ShuttingDown,
        })
    }

    /// Instantaneous number of queued jobs. Advisory only: there is no
    /// synchronization against concurrent enqueue/dequeue beyond what the
    /// channel itself provides. Use for health reporting, not correctness.
    pub fn queue_depth(&self) -> usize {
        let guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(tx) => tx.max_capacity() - tx.capacity(),
            None => 0,
        }
    }

    /// Cooperative drain-and-stop. Signals cancellation, closes the job
    /// channel, and waits for every worker to exit. No job is processed after
    /// this returns. Safe to call more than once.
    pub async fn shutdown(&self) {
        let sender = {
            let mut guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
            // Signal before close: workers blocked on receive wake via the
            // token or the channel closure, whichever they observe first.
            self.cancel.cancel();
            guard.take()
        };
        drop(sender);

        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Extraction worker panicked during shutdown");
            }
        }
        tracing::info!("Extraction processor stopped");
    }

    async fn worker_loop(
        worker_id: usize,
        rx: Arc<Mutex<mpsc::Receiver<ExtractionJob>>>,
        cancel: CancellationToken,
        extractor: Arc<dyn DocumentExtractor>,
    ) {
        loop {
            let job = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                job = async { rx.lock().await.recv().await } => match job {
                    Some(job) => job,
                    // Channel closed with no cancellation: nothing left to do.
                    None => break,
                },
            };

            let detail_id = job.detail_id;
            let document_id = job.request.document_id;
            tracing::debug!(worker_id, detail_id, document_id, "Processing extraction job");

            // At-most-once attempt: the job is consumed whether or not the
            // call succeeds.
            if let Err(e) = extractor.extract(&job.request).await {
                tracing::error!(
                    worker_id,
                    detail_id,
                    document_id,
                    error = %e,
                    "Extraction job failed"
                );
            }
        }
        tracing::debug!(worker_id, "Extraction worker exited");
    }
}
