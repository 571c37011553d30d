//! Progress tracking and reporting for the install pipeline

use std::sync::Arc;

/// Progress callback shared by every stage of an installation
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Events emitted while a pack is being installed
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A stale destination directory was removed before downloading
    DirectoryCleared {
        path: String,
    },
    /// One download attempt finished successfully
    FileDownloaded {
        completed: usize,
        total: usize,
        name: String,
        path: String,
        size: u64,
    },
    /// One download attempt failed
    FileFailed {
        completed: usize,
        total: usize,
        name: String,
        error: String,
    },
    /// Every download attempt of the batch has finished
    BatchFinished {
        completed: usize,
        total: usize,
    },
    /// Human-readable notice about a recoverable condition
    Notice {
        message: String,
    },
}

/// Trait for progress reporting with per-event hooks
pub trait ProgressReporter: Send + Sync {
    fn on_directory_cleared(&self, _path: &str) {}
    fn on_file_downloaded(&self, _completed: usize, _total: usize, _name: &str, _path: &str, _size: u64) {}
    fn on_file_failed(&self, _completed: usize, _total: usize, _name: &str, _error: &str) {}
    fn on_batch_finished(&self, _completed: usize, _total: usize) {}
    fn on_notice(&self, _message: &str) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::DirectoryCleared { path } => {
                self.on_directory_cleared(&path);
            }
            ProgressEvent::FileDownloaded { completed, total, name, path, size } => {
                self.on_file_downloaded(completed, total, &name, &path, size);
            }
            ProgressEvent::FileFailed { completed, total, name, error } => {
                self.on_file_failed(completed, total, &name, &error);
            }
            ProgressEvent::BatchFinished { completed, total } => {
                self.on_batch_finished(completed, total);
            }
            ProgressEvent::Notice { message } => {
                self.on_notice(&message);
            }
        })
    }
}

/// Console reporter printing the classic `[k/total]` progress lines
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_directory_cleared(&self, path: &str) {
        if self.verbose {
            println!("Removed stale directory '{}'", path);
        }
    }

    fn on_file_downloaded(&self, completed: usize, total: usize, name: &str, path: &str, size: u64) {
        println!("[{}/{}] Downloaded '{}' to '{}' [{} bytes]...", completed, total, name, path, size);
    }

    fn on_file_failed(&self, completed: usize, total: usize, name: &str, error: &str) {
        eprintln!("[{}/{}] Unable to download '{}': {}", completed, total, name, error);
    }

    fn on_batch_finished(&self, completed: usize, total: usize) {
        println!("[{}/{}] Finished.", completed, total);
    }

    fn on_notice(&self, message: &str) {
        println!("{}", message);
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}

/// Send an event if a callback is installed
pub(crate) fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = callback {
        callback(event);
    }
}
