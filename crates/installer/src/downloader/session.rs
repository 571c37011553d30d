//! Per-run install context shared by concurrent download tasks

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::core::progress::{emit, ProgressCallback, ProgressEvent};

/// State of one installation run
///
/// The completed counter is the only value mutated concurrently; it counts
/// finished attempts whether they succeeded or not.
pub struct InstallSession {
    install_root: PathBuf,
    total: usize,
    completed: AtomicUsize,
    progress: Option<ProgressCallback>,
}

impl InstallSession {
    pub fn new<P: Into<PathBuf>>(install_root: P, total: usize) -> Self {
        Self {
            install_root: install_root.into(),
            total,
            completed: AtomicUsize::new(0),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Count one finished attempt and return the new total
    pub fn record_attempt(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn emit(&self, event: ProgressEvent) {
        emit(self.progress.as_ref(), event);
    }

    pub fn notice<S: Into<String>>(&self, message: S) {
        self.emit(ProgressEvent::Notice { message: message.into() });
    }
}
