//! End-to-end pack installation
//!
//! Manifest → installer resolution → removal of files an earlier version
//! left behind → downloads → modloader install → start scripts. Only manifest problems and I/O on the install root stop the
//! run; everything later is reported and the run carries on.

use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

use crate::downloader::{
    download_all, unique_destinations, BatchReport, FileFetcher, HttpFetcher, InstallSession,
    ProgressCallback,
};
use crate::install::config::InstallerConfig;
use crate::install::error::{InstallError, Result};
use crate::install::invoker::{InstallerInvoker, InstallerState};
use crate::install::scripts::{write_start_scripts, StartCommand};
use crate::install::update::{read_previous_install, remove_dropped_files};
use crate::loaders::{ForgeMavenLookup, InstallerLookup};
use crate::manifest::{resolve_installer, CatalogClient, ManifestSource};

/// Copy of the manifest kept next to the installed files
pub const VERSION_FILE: &str = "version.json";

/// What an installation did
#[derive(Debug)]
pub struct InstallSummary {
    pub pack_name: String,
    pub install_root: PathBuf,
    pub downloads: BatchReport,
    pub installer_state: InstallerState,
    /// Start scripts created by this run
    pub scripts: Vec<PathBuf>,
}

/// Installs one pack version into the configured root
pub struct PackInstaller<L = ForgeMavenLookup, F = HttpFetcher> {
    config: InstallerConfig,
    catalog: CatalogClient,
    lookup: L,
    fetcher: F,
    progress_callback: Option<ProgressCallback>,
}

impl PackInstaller {
    /// Installer talking to the configured catalog and Forge maven over HTTP
    pub fn new(config: InstallerConfig) -> Result<Self> {
        let client = config.download.build_client().map_err(crate::downloader::DownloadError::from)?;
        let catalog = CatalogClient::with_base(client.clone(), &config.api_base)?;
        let lookup = ForgeMavenLookup::with_base(client.clone(), config.forge_maven.clone());
        let fetcher = HttpFetcher::new(client);
        Ok(Self::with_parts(config, catalog, lookup, fetcher))
    }
}

impl<L, F> PackInstaller<L, F>
where
    L: InstallerLookup,
    F: FileFetcher,
{
    pub fn with_parts(config: InstallerConfig, catalog: CatalogClient, lookup: L, fetcher: F) -> Self {
        Self {
            config,
            catalog,
            lookup,
            fetcher,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn install(&self, source: &ManifestSource) -> Result<InstallSummary> {
        // Nothing on disk changes until the manifest is known to be complete
        let mut pack = self.catalog.load(source).await?;
        pack.require_modloader()?;
        info!(
            "Installing {} {} ({}) for game {}",
            pack.name,
            pack.version_id,
            pack.kind,
            pack.game_version()?
        );

        let resolution = resolve_installer(&mut pack, &self.lookup).await?;

        let install_root = std::path::absolute(&self.config.install_root)
            .map_err(|e| InstallError::io(&self.config.install_root, e))?;
        fs::create_dir_all(&install_root)
            .await
            .map_err(|e| InstallError::io(&install_root, e))?;

        let files = unique_destinations(&install_root, pack.server_files().cloned());
        let session = InstallSession::new(&install_root, files.len())
            .with_progress(self.progress_callback.clone());

        if let Some(previous) = read_previous_install(&install_root).await {
            session.notice(format!(
                "Installing {} {} as an update of {}.",
                pack.name, pack.kind, previous.name
            ));
            remove_dropped_files(&install_root, &previous, &pack).await;
        }

        let downloads = download_all(
            &self.fetcher,
            &session,
            files,
            self.config.download.max_concurrent_downloads,
        )
        .await;

        if self.config.abort_on_download_failure && !downloads.is_complete_success() {
            return Err(InstallError::DownloadsFailed {
                failed: downloads.failed_count(),
                total: downloads.total,
            });
        }

        let mut invoker = InstallerInvoker::new(&self.config.java_command, &resolution);
        let installer_state = invoker.run(&session, &resolution, &downloads).await;

        let version_file = install_root.join(VERSION_FILE);
        if let Err(e) = fs::write(&version_file, &pack.raw_manifest).await {
            warn!("Unable to write {}: {}", version_file.display(), e);
        }

        let scripts = if self.config.generate_start_scripts {
            let command = StartCommand::resolve(
                resolution.loader(),
                &install_root,
                &self.config.script_dir,
                pack.minimum_ram,
                pack.recommended_ram,
            );
            write_start_scripts(&self.config.script_dir, &command).await
        } else {
            Vec::new()
        };

        session.notice("Pack install Finished.");

        Ok(InstallSummary {
            pack_name: pack.name,
            install_root,
            downloads,
            installer_state,
            scripts,
        })
    }
}
