//! Process launcher
//!
//! Spawns a user's game server in their own working directory and decides
//! whether the launch succeeded. The spawned process is detached: stdio is
//! discarded and the child is not killed when the handle drops, so the server
//! outlives the launcher.
//!
//! Readiness is a pluggable strategy. The shipped [`FixedDelayProbe`] waits a
//! fixed observation window and then checks whether the process is still
//! alive; it is a "did it crash immediately" heuristic, not a real readiness
//! check, but alternative probes (log pattern, health port) can be dropped in
//! without touching the task state machine.

use anyhow::{Context, Result};
use async_trait::async_trait;
use berth_core::domain::task::{TaskId, TaskStatus};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{error, info};

use crate::registry::TaskRegistry;

/// What the readiness probe observed after the observation window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Process was still running when probed
    Running,
    /// Process had already exited, with its exit code if one was available
    Exited(Option<i32>),
}

/// Strategy for judging whether a freshly spawned server came up
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn assess(&self, child: &mut Child) -> Result<LaunchOutcome>;
}

/// Probe that sleeps a fixed delay and then polls process liveness
pub struct FixedDelayProbe {
    delay: Duration,
}

impl FixedDelayProbe {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ReadinessProbe for FixedDelayProbe {
    async fn assess(&self, child: &mut Child) -> Result<LaunchOutcome> {
        tokio::time::sleep(self.delay).await;

        match child.try_wait().context("Failed to poll process status")? {
            None => Ok(LaunchOutcome::Running),
            Some(status) => Ok(LaunchOutcome::Exited(status.code())),
        }
    }
}

/// Launches game-server processes for dispatcher workers
pub struct ProcessLauncher {
    command: Vec<String>,
    data_root: PathBuf,
    probe: Arc<dyn ReadinessProbe>,
}

impl ProcessLauncher {
    pub fn new(command: Vec<String>, data_root: PathBuf, probe: Arc<dyn ReadinessProbe>) -> Self {
        Self {
            command,
            data_root,
            probe,
        }
    }

    /// Runs one launch attempt to completion and records the outcome.
    ///
    /// Every path through this function, including spawn errors, ends in
    /// exactly one registry update; a task handed to a worker can never stay
    /// pending after the worker returns.
    pub async fn run(&self, task_id: TaskId, owner: &str, registry: &TaskRegistry) {
        info!("Launching server for user {} (task {})", owner, task_id);

        match self.try_launch(owner).await {
            Ok(LaunchOutcome::Running) => {
                info!("Server for user {} is up (task {})", owner, task_id);
                registry.update(task_id, TaskStatus::Success, "server started");
            }
            Ok(LaunchOutcome::Exited(code)) => {
                error!(
                    "Server for user {} exited during startup (task {}, exit code {:?})",
                    owner, task_id, code
                );
                let message = match code {
                    Some(code) => format!("server failed to start (exit code {})", code),
                    None => "server failed to start (terminated by signal)".to_string(),
                };
                registry.update(task_id, TaskStatus::Failed, message);
            }
            Err(e) => {
                error!(
                    "Failed to launch server for user {} (task {}): {:#}",
                    owner, task_id, e
                );
                registry.update(
                    task_id,
                    TaskStatus::Failed,
                    format!("server failed to start: {:#}", e),
                );
            }
        }
    }

    /// Spawns the launch command in the user's game directory and applies the
    /// readiness probe. The child handle is dropped afterwards without
    /// terminating the process.
    async fn try_launch(&self, owner: &str) -> Result<LaunchOutcome> {
        let working_dir = self.data_root.join(owner).join("game");

        let (program, args) = self
            .command
            .split_first()
            .context("Launch command is empty")?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to spawn '{}' in {}",
                    program,
                    working_dir.display()
                )
            })?;

        self.probe.assess(&mut child).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::domain::task::next_task_id;

    fn launcher_with(command: &[&str], data_root: PathBuf, probe_ms: u64) -> ProcessLauncher {
        ProcessLauncher::new(
            command.iter().map(|s| s.to_string()).collect(),
            data_root,
            Arc::new(FixedDelayProbe::new(Duration::from_millis(probe_ms))),
        )
    }

    fn make_game_dir(root: &std::path::Path, owner: &str) {
        std::fs::create_dir_all(root.join(owner).join("game")).unwrap();
    }

    #[tokio::test]
    async fn test_long_lived_process_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        make_game_dir(dir.path(), "alice");

        let launcher = launcher_with(&["sleep", "2"], dir.path().to_path_buf(), 100);
        let registry = TaskRegistry::new();
        let id = next_task_id();
        registry.create(id, "alice");

        launcher.run(id, "alice", &registry).await;

        let task = registry.get(id).unwrap();
        assert_eq!(task.status, TaskStatus::Success);
        assert_eq!(task.message, "server started");
    }

    #[tokio::test]
    async fn test_immediate_exit_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        make_game_dir(dir.path(), "alice");

        let launcher = launcher_with(&["true"], dir.path().to_path_buf(), 200);
        let registry = TaskRegistry::new();
        let id = next_task_id();
        registry.create(id, "alice");

        launcher.run(id, "alice", &registry).await;

        let task = registry.get(id).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.message.contains("server failed to start"));
    }

    #[tokio::test]
    async fn test_missing_executable_reports_failure_with_reason() {
        let dir = tempfile::tempdir().unwrap();
        make_game_dir(dir.path(), "alice");

        let launcher = launcher_with(
            &["definitely-not-a-real-binary-berth"],
            dir.path().to_path_buf(),
            50,
        );
        let registry = TaskRegistry::new();
        let id = next_task_id();
        registry.create(id, "alice");

        launcher.run(id, "alice", &registry).await;

        let task = registry.get(id).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.message.contains("server failed to start:"));
        assert!(task.message.contains("Failed to spawn"));
    }

    #[tokio::test]
    async fn test_missing_working_directory_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        // No game directory created for bob

        let launcher = launcher_with(&["sleep", "2"], dir.path().to_path_buf(), 50);
        let registry = TaskRegistry::new();
        let id = next_task_id();
        registry.create(id, "bob");

        launcher.run(id, "bob", &registry).await;

        let task = registry.get(id).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(!task.message.is_empty());
    }

    #[tokio::test]
    async fn test_no_path_leaves_task_pending() {
        // Both the error path and the success path must end terminal
        let dir = tempfile::tempdir().unwrap();
        make_game_dir(dir.path(), "alice");
        let registry = TaskRegistry::new();

        for command in [["sleep", "2"].as_slice(), ["no-such-binary-berth"].as_slice()] {
            let launcher = launcher_with(command, dir.path().to_path_buf(), 50);
            let id = next_task_id();
            registry.create(id, "alice");
            launcher.run(id, "alice", &registry).await;
            assert!(registry.get(id).unwrap().status.is_terminal());
        }
    }
}
