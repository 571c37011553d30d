//! Command line front end for the server modpack installer
//!
//! ```bash
//! serverpack 99 100 --path ./server --start-scripts
//! serverpack --local pack.json --path ./server
//! ```
//!
//! Every flag can also be set through a `SERVERPACK_*` environment variable,
//! read from a `.env` file when present.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serverpack_installer::{
    ConsoleProgressReporter, DownloadConfig, InstallerConfig, InstallerState, IntoProgressCallback,
    ManifestSource, PackInstaller,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "serverpack", version, about = "Install a modpack server from the modpacks.ch catalog")]
struct Cli {
    /// Pack ID in the catalog
    #[arg(value_name = "PACK", required_unless_present = "local")]
    pack_id: Option<u64>,

    /// Version ID of the pack
    #[arg(value_name = "VERSION", required_unless_present = "local")]
    version_id: Option<u64>,

    /// Install from a manifest file on disk instead of the catalog
    #[arg(long, env = "SERVERPACK_LOCAL", conflicts_with_all = ["pack_id", "version_id"])]
    local: Option<PathBuf>,

    /// Directory to install the server into
    #[arg(long, env = "SERVERPACK_PATH", default_value = ".")]
    path: PathBuf,

    /// Write start.sh and start.bat
    #[arg(long, env = "SERVERPACK_START_SCRIPTS")]
    start_scripts: bool,

    /// Directory for the start scripts
    #[arg(long, env = "SERVERPACK_SCRIPT_DIR", default_value = ".")]
    script_dir: PathBuf,

    /// Java executable used to run the modloader installer
    #[arg(long, env = "SERVERPACK_JAVA", default_value = "java")]
    java: String,

    /// Maximum simultaneous downloads
    #[arg(long, env = "SERVERPACK_THREADS", default_value_t = 8)]
    threads: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "SERVERPACK_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Catalog API base URL
    #[arg(long, env = "SERVERPACK_API_BASE", default_value = serverpack_installer::manifest::DEFAULT_API_BASE)]
    api_base: String,

    /// Maven repository searched for Forge installers
    #[arg(long, env = "SERVERPACK_FORGE_MAVEN", default_value = serverpack_installer::loaders::lookup::FORGE_MAVEN)]
    forge_maven: String,

    /// Fail before installing the modloader if any download failed
    #[arg(long, env = "SERVERPACK_STRICT")]
    strict: bool,

    /// Print debug logs and every cleared directory
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn source(&self) -> Result<ManifestSource> {
        match (&self.local, self.pack_id, self.version_id) {
            (Some(file), _, _) => Ok(ManifestSource::LocalFile(file.clone())),
            (None, Some(pack_id), Some(version_id)) => Ok(ManifestSource::Catalog { pack_id, version_id }),
            _ => bail!("either a pack and version ID or --local <file> is required"),
        }
    }

    fn config(&self) -> InstallerConfig {
        let download = DownloadConfig::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_concurrent_downloads(self.threads);

        InstallerConfig::default()
            .with_install_root(&self.path)
            .with_script_dir(&self.script_dir)
            .with_java_command(&self.java)
            .with_start_scripts(self.start_scripts)
            .with_strict_downloads(self.strict)
            .with_api_base(&self.api_base)
            .with_forge_maven(&self.forge_maven)
            .with_download_config(download)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!("{:?}", cli);

    let source = cli.source()?;
    let installer = PackInstaller::new(cli.config())
        .context("failed to set up the installer")?
        .with_progress_callback(ConsoleProgressReporter::new(cli.verbose).into_callback());

    let summary = installer
        .install(&source)
        .await
        .context("installation failed")?;

    info!(
        "Installed {} into {}: {}/{} files, modloader {:?}",
        summary.pack_name,
        summary.install_root.display(),
        summary.downloads.successful_count(),
        summary.downloads.total,
        summary.installer_state
    );
    if summary.installer_state == InstallerState::FailedCleanupSkipped {
        debug!("Installer left in place for a manual install");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forge_maven_flag_reaches_config() {
        let cli = Cli::try_parse_from(["serverpack", "99", "100", "--forge-maven", "https://mirror.example/forge"]).unwrap();

        assert_eq!(cli.config().forge_maven, "https://mirror.example/forge");
        assert_eq!(cli.source().unwrap(), ManifestSource::Catalog { pack_id: 99, version_id: 100 });
    }

    #[test]
    fn test_local_manifest_needs_no_ids() {
        let cli = Cli::try_parse_from(["serverpack", "--local", "pack.json", "--threads", "2"]).unwrap();

        assert_eq!(cli.source().unwrap(), ManifestSource::LocalFile(PathBuf::from("pack.json")));
        assert_eq!(cli.config().download.max_concurrent_downloads, 2);
    }
}
