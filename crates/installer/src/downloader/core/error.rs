//! Error types for per-file downloads with file and URL context

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while preparing, fetching or verifying a single file
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP-related errors with context
    #[error("HTTP request to '{url}' failed")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("Server returned HTTP {status} for '{url}'")]
    HttpStatus {
        url: String,
        status: u16,
    },

    /// Network timeout
    #[error("Request to '{url}' timed out (check network or increase the timeout)")]
    NetworkTimeout {
        url: String,
    },

    /// File system I/O errors with file context
    #[error("Failed {operation} '{}'", path.display())]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// URL parsing errors
    #[error("Invalid URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Entry carries no URL and none could be resolved
    #[error("No download URL for '{name}'")]
    MissingUrl {
        name: String,
    },

    /// Checksum verification failed
    #[error("{algorithm} mismatch for '{}': expected {expected}, got {actual}", file.display())]
    ChecksumMismatch {
        file: PathBuf,
        algorithm: HashAlgorithm,
        expected: String,
        actual: String,
    },

    /// File size validation
    #[error("File size mismatch for '{}': expected {expected} bytes, got {actual} bytes (difference: {diff} bytes)", file.display())]
    SizeMismatch {
        file: PathBuf,
        expected: u64,
        actual: u64,
        diff: i64,
    },
}

/// Types of file operations for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Read,
    Write,
    Create,
    Delete,
    Move,
    Metadata,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Create => write!(f, "creating"),
            FileOperation::Delete => write!(f, "deleting"),
            FileOperation::Move => write!(f, "moving"),
            FileOperation::Metadata => write!(f, "reading metadata of"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

/// Checksum algorithms a manifest entry may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Map a manifest hash-type identifier to an algorithm.
    ///
    /// Unknown identifiers fall back to SHA-1, which is what the catalog
    /// publishes for every file.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => HashAlgorithm::Sha256,
            _ => HashAlgorithm::Sha1,
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithm::Sha1 => write!(f, "SHA-1"),
            HashAlgorithm::Sha256 => write!(f, "SHA-256"),
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl DownloadError {
    /// Short category name used in log fields
    pub fn category(&self) -> &'static str {
        match self {
            DownloadError::HttpRequest { .. } => "http_request",
            DownloadError::HttpStatus { .. } => "http_status",
            DownloadError::NetworkTimeout { .. } => "network_timeout",
            DownloadError::FileSystem { .. } => "file_system",
            DownloadError::InvalidUrl { .. } => "invalid_url",
            DownloadError::MissingUrl { .. } => "missing_url",
            DownloadError::ChecksumMismatch { .. } => "checksum_mismatch",
            DownloadError::SizeMismatch { .. } => "size_mismatch",
        }
    }

    /// Whether the failure means the downloaded bytes were wrong
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            DownloadError::ChecksumMismatch { .. } | DownloadError::SizeMismatch { .. }
        )
    }

    /// Get user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            DownloadError::NetworkTimeout { .. } => {
                Some("Check your internet connection or try increasing the timeout value")
            }
            DownloadError::ChecksumMismatch { .. } | DownloadError::SizeMismatch { .. } => {
                Some("The file may have changed upstream; run the installer again")
            }
            DownloadError::FileSystem { operation: FileOperation::Write | FileOperation::Create, .. } => {
                Some("Check free disk space and write permissions for the install directory")
            }
            _ => None,
        }
    }

    /// Attach a path and operation to a bare I/O error
    pub fn file_system(path: impl Into<PathBuf>, operation: FileOperation, source: std::io::Error) -> Self {
        DownloadError::FileSystem {
            path: path.into(),
            operation,
            source,
        }
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(error: reqwest::Error) -> Self {
        let url = error.url().map(|u| u.to_string()).unwrap_or_else(|| "<unknown>".to_string());

        if error.is_timeout() {
            DownloadError::NetworkTimeout { url }
        } else if let Some(status) = error.status() {
            DownloadError::HttpStatus { url, status: status.as_u16() }
        } else {
            DownloadError::HttpRequest { url, source: error }
        }
    }
}
