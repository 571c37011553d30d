//! File operation utilities shared by the fetcher and the orchestrator

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::downloader::core::error::{DownloadError, FileOperation, Result};

/// Temporary path used while a download is in flight
pub fn create_temp_path(dest_path: &Path) -> PathBuf {
    let mut name = dest_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest_path.with_file_name(name)
}

/// Atomically rename a temporary file to its final destination,
/// replacing whatever was there before
pub async fn atomic_rename(temp_path: &Path, dest_path: &Path) -> Result<()> {
    fs::rename(temp_path, dest_path)
        .await
        .map_err(|e| DownloadError::file_system(dest_path, FileOperation::Move, e))?;
    debug!("Atomically renamed {} to {}", temp_path.display(), dest_path.display());
    Ok(())
}

/// Create the parent directory of `path` if it is missing
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::file_system(parent, FileOperation::CreateDir, e))?;
        }
    }
    Ok(())
}

/// Best-effort removal of a file; a missing file is not an error
pub async fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DownloadError::file_system(path, FileOperation::Delete, e)),
    }
}
