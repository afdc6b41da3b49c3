//! Per-user directory layout and locking
//!
//! Every user owns `<data_root>/<username>/` with the game server under
//! `game/` and save archives under `game/saves/`. The three filesystem-
//! mutating operations (install, save upload, save download) take a per-user
//! async lock so concurrent requests from the same user cannot corrupt each
//! other's files; different users never contend.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Resolves and guards user data directories
pub struct UserDirs {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserDirs {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The user's top-level data directory
    pub fn user_root(&self, username: &str) -> PathBuf {
        self.root.join(username)
    }

    /// The user's game server directory (launch working directory)
    pub fn game_dir(&self, username: &str) -> PathBuf {
        self.user_root(username).join("game")
    }

    /// The user's save-game directory
    pub fn saves_dir(&self, username: &str) -> PathBuf {
        self.game_dir(username).join("saves")
    }

    /// Creates the user's data directory, typically at registration
    pub fn ensure_user_root(&self, username: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(self.user_root(username))
    }

    /// Acquires the user's filesystem lock.
    ///
    /// The guard is owned so it can be held across awaits and blocking
    /// sections.
    pub async fn lock_user(&self, username: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            Arc::clone(
                locks
                    .entry(username.to_string())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };

        lock.lock_owned().await
    }
}

/// Recursively copies a directory tree, overwriting existing files.
///
/// Returns the number of files copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<u64> {
    std::fs::create_dir_all(dst).with_context(|| format!("Failed to create {}", dst.display()))?;

    let mut copied = 0;
    let entries =
        std::fs::read_dir(src).with_context(|| format!("Failed to read {}", src.display()))?;

    for entry in entries {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
