//! Install Service
//!
//! Copies the server template into a user's own directory.

use std::sync::Arc;

use crate::userdirs::{UserDirs, copy_dir_recursive};

/// Service error type
#[derive(Debug)]
pub enum InstallError {
    /// The template user has no game directory to copy from
    TemplateNotFound(String),
    /// The copy itself failed
    Filesystem(String),
}

/// Install the template server tree into the user's game directory,
/// overwriting existing files.
///
/// Holds the user's filesystem lock for the duration so a concurrent save
/// upload or download cannot interleave with the copy.
pub async fn install_server(
    dirs: &Arc<UserDirs>,
    template_user: &str,
    owner: &str,
) -> Result<u64, InstallError> {
    let _guard = dirs.lock_user(owner).await;

    let template = dirs.game_dir(template_user);
    let target = dirs.game_dir(owner);

    if !template.is_dir() {
        return Err(InstallError::TemplateNotFound(template_user.to_string()));
    }

    let copied = tokio::task::spawn_blocking(move || copy_dir_recursive(&template, &target))
        .await
        .map_err(|e| InstallError::Filesystem(e.to_string()))?
        .map_err(|e| InstallError::Filesystem(format!("{:#}", e)))?;

    tracing::info!("Installed server for {} ({} files)", owner, copied);

    Ok(copied)
}
