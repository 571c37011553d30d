//! Installation module
//!
//! Drives a pack from manifest to a runnable server: downloads, the
//! modloader's own installer and the start scripts.

pub mod config;
pub mod error;
pub mod invoker;
pub mod pipeline;
pub mod scripts;
pub mod update;

// Re-export commonly used types
pub use config::InstallerConfig;
pub use error::{InstallError, Result};
pub use invoker::{InstallerInvoker, InstallerState};
pub use pipeline::{InstallSummary, PackInstaller, VERSION_FILE};
pub use scripts::{write_start_scripts, StartCommand, POSIX_SCRIPT, WINDOWS_SCRIPT};
pub use update::{dropped_files, read_previous_install, remove_dropped_files};

#[cfg(test)]
mod tests;
