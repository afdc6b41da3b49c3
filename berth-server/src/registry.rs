//! Task registry
//!
//! Shared, mutex-guarded mapping from task id to task state. The API layer
//! creates entries and answers status polls from it; dispatcher workers write
//! the terminal outcome. The registry is an explicitly owned object handed to
//! both sides behind an `Arc`, never a process-wide global.

use berth_core::domain::task::{Task, TaskId, TaskStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Thread-safe registry of launch tasks
pub struct TaskRegistry {
    tasks: Mutex<HashMap<TaskId, Task>>,
}

impl TaskRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts a pending entry for a freshly submitted task.
    ///
    /// Must be called before the task is handed to the dispatcher, so a
    /// status poll issued right after submission can never miss the entry.
    pub fn create(&self, id: TaskId, owner: &str) {
        let now = Utc::now();
        let task = Task {
            id,
            owner: owner.to_string(),
            status: TaskStatus::Pending,
            message: "server is starting".to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut tasks = self.tasks.lock().unwrap();
        tasks.insert(id, task);
    }

    /// Overwrites the status and message of an existing entry.
    ///
    /// Only the worker that ran the launch calls this, exactly once per task.
    /// An unknown id is logged and ignored; it can only happen if the entry
    /// was evicted while the launch was still in flight.
    pub fn update(&self, id: TaskId, status: TaskStatus, message: impl Into<String>) {
        let mut tasks = self.tasks.lock().unwrap();

        match tasks.get_mut(&id) {
            Some(task) => {
                task.status = status;
                task.message = message.into();
                task.updated_at = Utc::now();
            }
            None => {
                warn!("Update for unknown task {}", id);
            }
        }
    }

    /// Returns a snapshot of the task, or `None` if the id was never created
    /// (or has been evicted).
    pub fn get(&self, id: TaskId) -> Option<Task> {
        let tasks = self.tasks.lock().unwrap();
        tasks.get(&id).cloned()
    }

    /// Removes an entry outright.
    ///
    /// Used only to roll back a just-created entry when the dispatcher
    /// rejects the submission, before any worker could have seen it.
    pub fn remove(&self, id: TaskId) {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.remove(&id);
    }

    /// Evicts terminal entries whose last update is older than `retention`.
    ///
    /// Pending entries are never evicted. Returns the number of entries
    /// removed.
    pub fn evict_expired(&self, retention: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::hours(1));

        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|_, task| !task.status.is_terminal() || task.updated_at > cutoff);
        let evicted = before - tasks.len();

        if evicted > 0 {
            debug!("Evicted {} terminal task(s) from registry", evicted);
        }

        evicted
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Whether the registry holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
