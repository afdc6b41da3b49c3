//! Launch task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier for a launch task.
///
/// Derived from a millisecond-resolution timestamp at submission time and
/// made strictly monotonic within the process, so ids cannot collide for the
/// dispatcher's lifetime. Not unique across restarts (tasks are not
/// persisted).
pub type TaskId = u64;

static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

/// Generate the next task id.
///
/// Returns the current timestamp in milliseconds, bumped past the previously
/// issued id when two submissions land in the same millisecond.
pub fn next_task_id() -> TaskId {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    // fetch_update yields the previous value; the id actually issued is the
    // value the closure stored
    match LAST_ISSUED.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now.max(last + 1))
    }) {
        Ok(prev) => now.max(prev + 1),
        Err(_) => now,
    }
}

/// One server-launch attempt
///
/// Created `pending` when the launch request is accepted, then transitioned
/// exactly once to a terminal status by the dispatcher worker that ran it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner: String,
    pub status: TaskStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Launch task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Success,
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal (the task will never change again)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ids_are_strictly_increasing() {
        let mut prev = next_task_id();
        for _ in 0..1000 {
            let id = next_task_id();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn test_task_ids_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..500).map(|_| next_task_id()).collect::<Vec<_>>()))
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }

        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}
