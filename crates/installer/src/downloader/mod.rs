//! Downloader module
//!
//! Per-file fetching and verification, download configuration and the
//! concurrent batch that places a pack's files on disk.

pub mod batch;
pub mod config;
pub mod core;
pub mod session;

// Re-export main types for convenience
pub use batch::{download_all, plan_directories, unique_destinations, BatchReport, DownloadOutcome};
pub use config::DownloadConfig;
pub use core::{
    ConsoleProgressReporter, DownloadError, FileFetcher, FileOperation, FileValidation,
    HashAlgorithm, HttpFetcher, IntoProgressCallback, NullProgressReporter, ProgressCallback,
    ProgressEvent, ProgressReporter, Result,
};
pub use session::InstallSession;
