//! Hand-off between intake and execution.
//!
//! Intake pushes [`Job`]s into a bounded channel; a fixed group of workers
//! pulls them and runs each through the [`TaskExecutor`]. Dropping every
//! [`TaskQueue`] closes the channel, and workers exit once it is drained.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::executor::{Job, TaskExecutor};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("task queue is full, try again later")]
    Full,
    #[error("task queue is closed")]
    Closed,
}

/// Sending side, cloned into every request handler.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: mpsc::Sender<Job>,
}

impl TaskQueue {
    /// Enqueue without waiting. Never blocks the request path.
    pub fn submit(&self, job: Job) -> Result<(), QueueError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

/// Create a queue of `capacity` jobs drained by `workers` workers.
pub fn start(capacity: usize, workers: usize, executor: Arc<TaskExecutor>) -> (TaskQueue, WorkerPool) {
    let (tx, rx) = mpsc::channel(capacity);
    let pool = WorkerPool::spawn(workers, rx, executor);
    (TaskQueue { tx }, pool)
}

/// Worker group handle.
pub struct WorkerPool {
    joins: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `n` workers sharing one receiver.
    pub fn spawn(n: usize, rx: mpsc::Receiver<Job>, executor: Arc<TaskExecutor>) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let joins = (0..n)
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let executor = Arc::clone(&executor);
                tokio::spawn(worker_loop(worker_id, rx, executor))
            })
            .collect();
        Self { joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Wait for the workers to finish the queued jobs. Workers still busy
    /// after `grace` are aborted. Returns `true` on a clean drain.
    ///
    /// Only resolves early once every [`TaskQueue`] has been dropped.
    pub async fn drain(self, grace: Duration) -> bool {
        let aborts: Vec<_> = self.joins.iter().map(|j| j.abort_handle()).collect();
        match tokio::time::timeout(grace, futures::future::join_all(self.joins)).await {
            Ok(_) => true,
            Err(_) => {
                warn!(workers = aborts.len(), "drain timed out; aborting workers");
                for handle in aborts {
                    handle.abort();
                }
                false
            }
        }
    }
}

async fn worker_loop(worker_id: usize, rx: Arc<Mutex<mpsc::Receiver<Job>>>, executor: Arc<TaskExecutor>) {
    debug!(worker_id, "worker started");
    loop {
        // Hold the lock only while waiting for the next job.
        let job = { rx.lock().await.recv().await };
        let Some(job) = job else {
            break;
        };

        let request_id = job
            .request_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let span = info_span!(
            "job",
            worker_id,
            task_id = %job.task_id,
            request_id = %request_id,
            user_id = job.user_id.as_deref().unwrap_or(""),
            org_id = job.org_id.as_deref().unwrap_or(""),
        );
        async {
            let report = executor.run(job).await;
            info!(state = ?report.state(), delivered = report.delivered, "job finished");
        }
        .instrument(span)
        .await;
    }
    debug!(worker_id, "worker stopped");
}
