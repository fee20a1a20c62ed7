use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::metrics::SYNC_JOBS_ENQUEUED;

use super::SyncOrchestrator;

/// Payload of a deferred sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJob {
    pub order_id: u64,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("sync queue is full")]
    Full,

    #[error("sync queue is closed")]
    Closed,
}

/// Handle for scheduling sync runs.
///
/// Cheaply cloneable. The worker keeps running while at least one handle
/// is alive.
#[derive(Clone)]
pub struct SyncQueue {
    tx: mpsc::Sender<SyncJob>,
}

impl SyncQueue {
    pub fn new(tx: mpsc::Sender<SyncJob>) -> Self {
        Self { tx }
    }

    /// Queue a job, waiting for room if the buffer is full.
    pub async fn enqueue(&self, job: SyncJob) -> Result<(), QueueError> {
        self.tx.send(job).await.map_err(|_| QueueError::Closed)?;
        SYNC_JOBS_ENQUEUED.inc();
        Ok(())
    }

    /// Jobs buffered and not yet picked up by the worker.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Queue a job without waiting.
    pub fn try_enqueue(&self, job: SyncJob) -> Result<(), QueueError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })?;
        SYNC_JOBS_ENQUEUED.inc();
        Ok(())
    }
}

/// Background task that runs queued jobs one at a time.
pub struct SyncWorker {
    rx: mpsc::Receiver<SyncJob>,
    orchestrator: Arc<SyncOrchestrator>,
}

impl SyncWorker {
    pub fn new(rx: mpsc::Receiver<SyncJob>, orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self { rx, orchestrator }
    }

    /// Consume jobs until every [`SyncQueue`] handle is dropped.
    ///
    /// Jobs already buffered when the last handle goes away are still run.
    pub async fn run(mut self) {
        tracing::info!("Sync worker started");

        while let Some(job) = self.rx.recv().await {
            let outcome = self.orchestrator.on_scheduled_sync(job).await;
            tracing::debug!(order_id = job.order_id, outcome = outcome.label(), "Sync job done");
        }

        tracing::info!("Sync worker shutting down");
    }
}

/// Create the deferred sync machinery.
///
/// Returns the handle to schedule jobs with, and the worker to spawn with
/// `tokio::spawn(worker.run())`.
pub fn create_sync_queue(
    orchestrator: Arc<SyncOrchestrator>,
    buffer_size: usize,
) -> (SyncQueue, SyncWorker) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (SyncQueue::new(tx), SyncWorker::new(rx, orchestrator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_delivers_job() {
        let (tx, mut rx) = mpsc::channel(4);
        let queue = SyncQueue::new(tx);

        queue.enqueue(SyncJob { order_id: 42 }).await.unwrap();

        assert_eq!(queue.pending(), 1);
        let job = rx.recv().await.expect("Should receive job");
        assert_eq!(job.order_id, 42);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_try_enqueue_full_channel() {
        let (tx, _rx) = mpsc::channel(1);
        let queue = SyncQueue::new(tx);

        assert!(queue.try_enqueue(SyncJob { order_id: 1 }).is_ok());
        assert!(matches!(
            queue.try_enqueue(SyncJob { order_id: 2 }),
            Err(QueueError::Full)
        ));
    }

    #[tokio::test]
    async fn test_enqueue_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        let queue = SyncQueue::new(tx);
        drop(rx);

        assert!(matches!(
            queue.enqueue(SyncJob { order_id: 1 }).await,
            Err(QueueError::Closed)
        ));
        assert!(matches!(
            queue.try_enqueue(SyncJob { order_id: 1 }),
            Err(QueueError::Closed)
        ));
    }

    #[test]
    fn test_job_payload_shape() {
        let json = serde_json::to_string(&SyncJob { order_id: 7 }).unwrap();
        assert_eq!(json, r#"{"order_id":7}"#);
    }
}
