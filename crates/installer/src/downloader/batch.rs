//! Concurrent download of every server-side file of a pack

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::downloader::core::{FileFetcher, ProgressEvent, Result};
use crate::downloader::session::InstallSession;
use crate::manifest::FileEntry;

/// Result of one download attempt
#[derive(Debug)]
pub struct DownloadOutcome {
    pub name: String,
    pub destination: PathBuf,
    pub is_modloader: bool,
    /// Bytes written on success
    pub result: Result<u64>,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything a batch did, in completion order
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<DownloadOutcome>,
    pub completed: usize,
    pub total: usize,
    pub duration: Duration,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn successful_count(&self) -> usize {
        self.outcomes.len() - self.failed_count()
    }

    pub fn total_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn outcome_for(&self, name: &str) -> Option<&DownloadOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Unique destination directories of `files`, in first-seen order.
/// Files landing directly in the root contribute nothing.
pub fn plan_directories<'a, I>(root: &Path, files: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a FileEntry>,
{
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter_map(|f| f.destination_dir(root))
        .filter(|dir| seen.insert(dir.clone()))
        .collect()
}

/// Server-side entries with one entry per destination. When two entries
/// target the same file the later one wins; order otherwise follows `files`.
pub fn unique_destinations<I>(root: &Path, files: I) -> Vec<FileEntry>
where
    I: IntoIterator<Item = FileEntry>,
{
    let files: Vec<FileEntry> = files.into_iter().filter(|f| f.is_server_side()).collect();
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(files.len());
    for entry in files.into_iter().rev() {
        let destination = entry.destination(root);
        if seen.insert(destination.clone()) {
            unique.push(entry);
        } else {
            debug!("Skipping earlier duplicate of {}", destination.display());
        }
    }
    unique.reverse();
    unique
}

/// Remove each directory that exists, once. Returns how many were removed.
pub async fn clear_directories(session: &InstallSession, dirs: &[PathBuf]) -> usize {
    let mut removed = 0;
    for dir in dirs {
        if dir.as_path() == session.install_root() {
            continue;
        }
        match fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => continue,
        }

        match fs::remove_dir_all(dir).await {
            Ok(()) => {
                debug!("Removed {}", dir.display());
                removed += 1;
                session.emit(ProgressEvent::DirectoryCleared {
                    path: dir.display().to_string(),
                });
            }
            Err(e) => warn!("Unable to remove {}: {}", dir.display(), e),
        }
    }
    removed
}

/// Prepare and fetch one entry, reporting the attempt to the session
async fn download_one<F>(fetcher: &F, session: &InstallSession, mut entry: FileEntry) -> DownloadOutcome
where
    F: FileFetcher + ?Sized,
{
    let destination = entry.destination(session.install_root());

    let result = match fetcher.prepare(&mut entry).await {
        Ok(()) => fetcher.fetch(&entry, &destination).await,
        Err(e) => Err(e),
    };

    let completed = session.record_attempt();
    match &result {
        Ok(size) => session.emit(ProgressEvent::FileDownloaded {
            completed,
            total: session.total(),
            name: entry.name.clone(),
            path: entry.path.clone(),
            size: *size,
        }),
        Err(e) => {
            error!("Unable to download {}: {}", entry.name, e);
            if e.is_integrity_failure() {
                warn!("{} did not match the manifest and was removed", entry.name);
            }
            if let Some(hint) = e.suggestion() {
                debug!("{}: {}", e.category(), hint);
            }
            session.emit(ProgressEvent::FileFailed {
                completed,
                total: session.total(),
                name: entry.name.clone(),
                error: e.to_string(),
            });
        }
    }

    DownloadOutcome {
        is_modloader: entry.is_modloader(),
        name: entry.name,
        destination,
        result,
    }
}

/// Download every server-side entry of `files` into the session's root.
///
/// Stale destination directories are cleared before any task starts. Entries
/// sharing a destination are fetched once. A failed file never stops its
/// siblings; failures are only reported.
pub async fn download_all<F>(
    fetcher: &F,
    session: &InstallSession,
    files: Vec<FileEntry>,
    max_concurrent: usize,
) -> BatchReport
where
    F: FileFetcher + ?Sized,
{
    let start = Instant::now();
    let files = unique_destinations(session.install_root(), files);

    let dirs = plan_directories(session.install_root(), &files);
    let cleared = clear_directories(session, &dirs).await;
    debug!("Cleared {} of {} destination directories", cleared, dirs.len());

    info!(
        "Downloading {} files with max_concurrent={}",
        files.len(),
        max_concurrent
    );

    let outcomes: Vec<DownloadOutcome> = stream::iter(files)
        .map(|entry| download_one(fetcher, session, entry))
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let completed = session.completed();
    session.emit(ProgressEvent::BatchFinished {
        completed,
        total: session.total(),
    });

    let report = BatchReport {
        outcomes,
        completed,
        total: session.total(),
        duration: start.elapsed(),
    };
    info!(
        "Batch finished in {:.1}s: {} succeeded, {} failed, {} bytes",
        report.duration.as_secs_f64(),
        report.successful_count(),
        report.failed_count(),
        report.total_bytes()
    );
    report
}
