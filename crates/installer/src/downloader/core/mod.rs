//! Core types used throughout the downloader
//!
//! The per-file capability ([`FileFetcher`]) and the types it shares with
//! the batch orchestrator: errors, validation and progress events.

pub mod error;
pub mod files;
pub mod http;
pub mod progress;
pub mod validation;

pub use error::{DownloadError, FileOperation, HashAlgorithm, Result};
pub use http::HttpFetcher;
pub use progress::{
    ConsoleProgressReporter, IntoProgressCallback, NullProgressReporter, ProgressCallback,
    ProgressEvent, ProgressReporter,
};
pub use validation::FileValidation;

use async_trait::async_trait;
use std::path::Path;

use crate::manifest::FileEntry;

/// Knows how to fetch and verify one manifest file
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Fill in anything the entry needs before it can be fetched
    async fn prepare(&self, entry: &mut FileEntry) -> Result<()>;

    /// Download `entry` to `dest`, replacing any existing file, and verify it.
    /// Returns the number of bytes written.
    async fn fetch(&self, entry: &FileEntry, dest: &Path) -> Result<u64>;
}
