//! Manifest fetch and parse errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop an installation before anything touches the disk
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to reach the catalog at '{url}'")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Catalog returned HTTP {status} for '{url}'")]
    Status { url: String, status: u16 },

    #[error("Catalog rejected the request: {message}")]
    Catalog { message: String },

    #[error("Malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read manifest '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Manifest does not declare a {0} target")]
    MissingTarget(&'static str),

    #[error("Manifest does not declare a modloader type and version")]
    MissingModloader,
}

pub type Result<T> = std::result::Result<T, ManifestError>;
