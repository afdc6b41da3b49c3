//! Launch Service
//!
//! Submission and status-polling logic for server launch tasks.

use berth_core::domain::task::{Task, TaskId, next_task_id};

use crate::dispatcher::{DispatcherHandle, LaunchJob, SubmitError};
use crate::registry::TaskRegistry;

/// Service error type
#[derive(Debug)]
pub enum LaunchError {
    /// The dispatcher rejected the submission (backpressure)
    Rejected(SubmitError),
    /// No task with this id is visible to this user
    NotFound(TaskId),
}

/// Create a pending task and hand it to the dispatcher.
///
/// The registry entry is created before submission, so a poll issued
/// immediately after this returns can never see NotFound. If the dispatcher
/// queue is full the entry is rolled back and the rejection is surfaced to
/// the caller; failures after acceptance are only observable via polling.
pub fn submit(
    registry: &TaskRegistry,
    dispatcher: &DispatcherHandle,
    owner: &str,
) -> Result<TaskId, LaunchError> {
    let task_id = next_task_id();
    registry.create(task_id, owner);

    let job = LaunchJob {
        task_id,
        owner: owner.to_string(),
    };

    if let Err(e) = dispatcher.submit(job) {
        registry.remove(task_id);
        tracing::warn!("Launch submission rejected for {}: {}", owner, e);
        return Err(LaunchError::Rejected(e));
    }

    tracing::info!("Launch task {} submitted for user {}", task_id, owner);

    Ok(task_id)
}

/// Look up the current snapshot of a task, scoped to its owner.
///
/// A task belonging to another user is reported exactly like a missing one,
/// so ids do not leak across tenants.
pub fn status(registry: &TaskRegistry, task_id: TaskId, owner: &str) -> Result<Task, LaunchError> {
    match registry.get(task_id) {
        Some(task) if task.owner == owner => Ok(task),
        _ => Err(LaunchError::NotFound(task_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::launcher::{FixedDelayProbe, ProcessLauncher};
    use berth_core::domain::task::TaskStatus;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_dispatcher(
        registry: Arc<TaskRegistry>,
        data_root: std::path::PathBuf,
        workers: usize,
        capacity: usize,
    ) -> Dispatcher {
        let launcher = Arc::new(ProcessLauncher::new(
            vec!["sleep".to_string(), "2".to_string()],
            data_root,
            Arc::new(FixedDelayProbe::new(Duration::from_millis(50))),
        ));
        Dispatcher::start(workers, capacity, launcher, registry)
    }

    #[tokio::test]
    async fn test_submit_is_immediately_pollable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("alice/game")).unwrap();

        let registry = Arc::new(TaskRegistry::new());
        let dispatcher =
            test_dispatcher(Arc::clone(&registry), dir.path().to_path_buf(), 2, 8);
        let handle = dispatcher.handle();

        let id = submit(&registry, &handle, "alice").unwrap();

        // Never NotFound right after submission
        let task = status(&registry, id, "alice").unwrap();
        assert!(task.status == TaskStatus::Pending || task.status.is_terminal());

        drop(handle);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_status_is_scoped_to_owner() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("alice/game")).unwrap();

        let registry = Arc::new(TaskRegistry::new());
        let dispatcher =
            test_dispatcher(Arc::clone(&registry), dir.path().to_path_buf(), 1, 8);
        let handle = dispatcher.handle();

        let id = submit(&registry, &handle, "alice").unwrap();

        assert!(status(&registry, id, "alice").is_ok());
        assert!(matches!(
            status(&registry, id, "mallory"),
            Err(LaunchError::NotFound(_))
        ));

        drop(handle);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registry = TaskRegistry::new();
        assert!(matches!(
            status(&registry, 424242, "alice"),
            Err(LaunchError::NotFound(424242))
        ));
    }

    #[tokio::test]
    async fn test_rejected_submission_rolls_back_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("alice/game")).unwrap();

        let registry = Arc::new(TaskRegistry::new());
        let dispatcher =
            test_dispatcher(Arc::clone(&registry), dir.path().to_path_buf(), 1, 1);
        let handle = dispatcher.handle();

        let mut accepted = 0;
        let mut rejected = false;
        for _ in 0..10 {
            match submit(&registry, &handle, "alice") {
                Ok(_) => accepted += 1,
                Err(LaunchError::Rejected(SubmitError::QueueFull)) => {
                    rejected = true;
                    break;
                }
                Err(e) => panic!("unexpected error: {:?}", e),
            }
        }
        assert!(rejected, "queue never filled up");
        // The rejected submission left no orphan pending entry behind
        assert_eq!(registry.len(), accepted);

        drop(handle);
        dispatcher.shutdown().await;
    }
}
