//! Server Modpack Installer Library
//!
//! Installs a server-side modpack from the modpacks.ch catalog: fetches the
//! pack version manifest, downloads every server-side file concurrently,
//! runs the modloader's installer and writes start scripts.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use serverpack_installer::{
//!     ConsoleProgressReporter, InstallerConfig, IntoProgressCallback, ManifestSource,
//!     PackInstaller,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InstallerConfig::default()
//!     .with_install_root("./server")
//!     .with_start_scripts(true);
//!
//! let installer = PackInstaller::new(config)?
//!     .with_progress_callback(ConsoleProgressReporter::new(false).into_callback());
//!
//! let summary = installer
//!     .install(&ManifestSource::Catalog { pack_id: 99, version_id: 100 })
//!     .await?;
//! println!("{} files failed", summary.downloads.failed_count());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Manifest sources**: the catalog API or a local manifest file
//! - **Concurrent downloads**: bounded fan-out with per-file SHA-1/SHA-256 and size checks
//! - **Partial failure**: failed files are reported, siblings carry on; strict mode opt-in
//! - **Forge**: installer lookup on the Forge maven and unattended server install
//! - **Updates**: files dropped since the previous `version.json` are removed
//! - **Start scripts**: `start.sh` and `start.bat`, never overwritten

pub mod downloader;
pub mod install;
pub mod loaders;
pub mod manifest;

// Re-export commonly used types for convenience
pub use downloader::{
    BatchReport, ConsoleProgressReporter, DownloadConfig, DownloadError, DownloadOutcome,
    FileFetcher, HttpFetcher, InstallSession, IntoProgressCallback, NullProgressReporter,
    ProgressCallback, ProgressEvent, ProgressReporter,
};
pub use install::{InstallError, InstallSummary, InstallerConfig, InstallerState, PackInstaller};
pub use loaders::{ForgeMavenLookup, InstallerLookup, Modloader};
pub use manifest::{CatalogClient, FileEntry, ManifestError, ManifestSource, PackVersion};
