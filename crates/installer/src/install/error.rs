//! Installation error types

use std::path::PathBuf;
use thiserror::Error;

use crate::downloader::DownloadError;
use crate::manifest::ManifestError;

/// Errors that stop an installation
#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("IO error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Only raised when downloads are required to all succeed
    #[error("{failed} of {total} files failed to download")]
    DownloadsFailed { failed: usize, total: usize },
}

impl InstallError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstallError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;
