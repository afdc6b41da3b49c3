//! Saves Service
//!
//! Save-game archive download and upload for a single user.

use std::io::Cursor;
use std::sync::Arc;

use crate::archive;
use crate::userdirs::UserDirs;

/// Service error type
#[derive(Debug)]
pub enum SavesError {
    /// The user has no saves directory yet
    NoSaves(String),
    /// The uploaded archive could not be read
    BadArchive(String),
    /// Compression, extraction, or directory access failed
    Filesystem(String),
}

/// Compress the user's saves directory into an in-memory zip.
///
/// Holds the user's filesystem lock so a concurrent upload cannot produce a
/// torn archive.
pub async fn download_saves(dirs: &Arc<UserDirs>, owner: &str) -> Result<Vec<u8>, SavesError> {
    let _guard = dirs.lock_user(owner).await;

    let saves = dirs.saves_dir(owner);
    if !saves.is_dir() {
        return Err(SavesError::NoSaves(owner.to_string()));
    }

    let bytes = tokio::task::spawn_blocking(move || {
        archive::compress_dir(&saves, Cursor::new(Vec::new())).map(Cursor::into_inner)
    })
    .await
    .map_err(|e| SavesError::Filesystem(e.to_string()))?
    .map_err(|e| SavesError::Filesystem(format!("{:#}", e)))?;

    tracing::info!(
        "Prepared saves archive for {} ({} bytes)",
        owner,
        bytes.len()
    );

    Ok(bytes)
}

/// Extract an uploaded zip into the user's saves directory, overwriting.
pub async fn upload_saves(
    dirs: &Arc<UserDirs>,
    owner: &str,
    payload: Vec<u8>,
) -> Result<(), SavesError> {
    if payload.is_empty() {
        return Err(SavesError::BadArchive("uploaded file is empty".to_string()));
    }

    let _guard = dirs.lock_user(owner).await;

    let saves = dirs.saves_dir(owner);

    tokio::task::spawn_blocking(move || archive::extract_zip(Cursor::new(payload), &saves))
        .await
        .map_err(|e| SavesError::Filesystem(e.to_string()))?
        .map_err(|e| SavesError::BadArchive(format!("{:#}", e)))?;

    tracing::info!("Extracted saves archive for {}", owner);

    Ok(())
}
