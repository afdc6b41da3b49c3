//! Task DTOs for the launch and status-polling endpoints

use serde::{Deserialize, Serialize};

use crate::domain::task::{Task, TaskId, TaskStatus};

/// Response to a launch submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchResponse {
    pub success: bool,
    pub message: String,
    pub task_id: TaskId,
}

/// Response to a status poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub success: bool,
    pub status: TaskStatus,
    pub message: String,
}

impl From<Task> for TaskStatusResponse {
    fn from(task: Task) -> Self {
        Self {
            success: true,
            status: task.status,
            message: task.message,
        }
    }
}

/// Generic `{success, message}` body used by operations without a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
