//! Task dispatcher
//!
//! Decouples launch submission (must return fast to keep the HTTP handler
//! responsive) from launch execution (blocks for the whole observation
//! window). A fixed pool of worker tasks consumes a bounded queue; when the
//! queue is full, submission is rejected with a backpressure error instead of
//! growing without bound.
//!
//! Shutdown is graceful: closing the queue lets every worker finish its
//! in-flight launch before the process exits, so no task is left with a
//! half-written status.

use berth_core::domain::task::TaskId;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::launcher::ProcessLauncher;
use crate::registry::TaskRegistry;

/// Unit of work handed to a dispatcher worker
#[derive(Debug, Clone)]
pub struct LaunchJob {
    pub task_id: TaskId,
    pub owner: String,
}

/// Why a submission was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The queue is at capacity; the caller should back off and retry
    QueueFull,
    /// The dispatcher is shutting down and no longer accepts work
    ShuttingDown,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::QueueFull => write!(f, "launch queue is full"),
            SubmitError::ShuttingDown => write!(f, "dispatcher is shutting down"),
        }
    }
}

/// Cloneable submission handle held by the API layer
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<LaunchJob>,
}

impl DispatcherHandle {
    /// Enqueues a launch job without blocking.
    ///
    /// The task's registry entry must already exist (create happens-before
    /// submit), so a poll racing this call still observes at least `pending`.
    pub fn submit(&self, job: LaunchJob) -> Result<(), SubmitError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SubmitError::ShuttingDown,
        })
    }
}

/// Worker pool executing launch jobs off the request path
pub struct Dispatcher {
    tx: mpsc::Sender<LaunchJob>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawns `worker_count` workers over a queue of `queue_capacity` slots
    pub fn start(
        worker_count: usize,
        queue_capacity: usize,
        launcher: Arc<ProcessLauncher>,
        registry: Arc<TaskRegistry>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<LaunchJob>(queue_capacity);
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..worker_count)
            .map(|worker_idx| {
                let rx = Arc::clone(&rx);
                let launcher = Arc::clone(&launcher);
                let registry = Arc::clone(&registry);

                tokio::spawn(async move {
                    loop {
                        // Hold the receiver lock only while waiting for the
                        // next job, never while running one
                        let job = { rx.lock().await.recv().await };

                        match job {
                            Some(job) => {
                                debug!(
                                    "Worker {} picked up task {} for user {}",
                                    worker_idx, job.task_id, job.owner
                                );
                                launcher.run(job.task_id, &job.owner, &registry).await;
                            }
                            None => {
                                debug!("Worker {} shutting down", worker_idx);
                                break;
                            }
                        }
                    }
                })
            })
            .collect();

        info!(
            "Dispatcher started with {} worker(s), queue capacity {}",
            worker_count, queue_capacity
        );

        Self { tx, workers }
    }

    /// Returns a cloneable submission handle
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            tx: self.tx.clone(),
        }
    }

    /// Closes the queue and waits for every worker to drain its in-flight
    /// work. Call after the HTTP server has stopped, when no handler holds a
    /// submission handle anymore.
    pub async fn shutdown(self) {
        info!("Dispatcher shutting down, draining in-flight launches");
        drop(self.tx);

        for handle in self.workers {
            let _ = handle.await;
        }

        info!("Dispatcher drained");
    }
}
