//! Runs the modloader's own installer once the pack files are in place

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::downloader::core::files::remove_if_exists;
use crate::downloader::{BatchReport, InstallSession};
use crate::loaders::Modloader;
use crate::manifest::InstallerResolution;

const BANNER_BEGIN: &str = "================= FORGE INSTALL BEGINS =================";
const BANNER_END: &str = "=================  FORGE INSTALL ENDS  =================";

/// Lifecycle of the modloader installer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerState {
    /// Unsupported loader or no installer was found
    NotApplicable,
    /// Installer queued with the pack files
    Downloading,
    Invoking,
    Verifying,
    /// Artifact present; installer jar and log removed
    Succeeded,
    /// Installer left on disk for a manual install
    FailedCleanupSkipped,
}

impl InstallerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InstallerState::NotApplicable
                | InstallerState::Succeeded
                | InstallerState::FailedCleanupSkipped
        )
    }
}

pub struct InstallerInvoker {
    java_command: OsString,
    state: InstallerState,
}

impl InstallerInvoker {
    pub fn new<S: Into<OsString>>(java_command: S, resolution: &InstallerResolution) -> Self {
        let state = match resolution {
            InstallerResolution::Queued { .. } => InstallerState::Downloading,
            _ => InstallerState::NotApplicable,
        };
        Self { java_command: java_command.into(), state }
    }

    pub fn state(&self) -> InstallerState {
        self.state
    }

    fn transition(&mut self, next: InstallerState) {
        debug!("Installer state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Drive the installer to a terminal state. Never fails: every problem
    /// ends in a console message asking for a manual install.
    pub async fn run(
        &mut self,
        session: &InstallSession,
        resolution: &InstallerResolution,
        report: &BatchReport,
    ) -> InstallerState {
        match resolution {
            InstallerResolution::Unsupported { kind, .. } => {
                session.notice(format!(
                    "Modloader type {} is not currently supported. Please check if an updated version of the downloader is available.",
                    kind
                ));
                self.transition(InstallerState::NotApplicable);
            }
            InstallerResolution::NotFound { loader } => {
                session.notice(format!(
                    "Could not find download location for {}. Please install manually.",
                    loader
                ));
                self.transition(InstallerState::NotApplicable);
            }
            InstallerResolution::Queued { loader, file_name } => {
                let downloaded = report
                    .outcome_for(file_name)
                    .is_some_and(|outcome| outcome.is_success());
                if downloaded {
                    self.install(session, loader, file_name).await;
                } else {
                    warn!("Installer {} was not downloaded", file_name);
                    report_failure(session, loader);
                    self.transition(InstallerState::FailedCleanupSkipped);
                }
            }
        }
        self.state
    }

    async fn install(&mut self, session: &InstallSession, loader: &Modloader, file_name: &str) {
        let root = session.install_root();
        let installer = root.join(file_name);

        self.transition(InstallerState::Invoking);
        session.notice(format!("Invoking {} installer.", loader));
        session.notice(BANNER_BEGIN);
        let launched = self.spawn(loader, &installer, root).await;

        self.transition(InstallerState::Verifying);
        let artifact = loader.probe_artifact(root);
        session.notice(BANNER_END);

        match artifact {
            Some(artifact) if launched => {
                info!("{} installed: {}", loader, artifact.display());
                cleanup(&installer, &root.join(format!("{}.log", file_name))).await;
                self.transition(InstallerState::Succeeded);
            }
            _ => {
                report_failure(session, loader);
                self.transition(InstallerState::FailedCleanupSkipped);
            }
        }
    }

    /// Run `<java> -jar <installer> --installServer <root>` in the install
    /// root with inherited stdio. The exit status is only logged.
    async fn spawn(&self, loader: &Modloader, installer: &Path, root: &Path) -> bool {
        let mut command = Command::new(&self.java_command);
        command
            .args(loader.installer_arguments(installer, root))
            .current_dir(root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        match command.status().await {
            Ok(status) => {
                debug!("Installer exited with {}", status);
                true
            }
            Err(e) => {
                error!(
                    "Failed to run {:?} for {}: {}",
                    self.java_command,
                    installer.display(),
                    e
                );
                false
            }
        }
    }
}

fn report_failure(session: &InstallSession, loader: &Modloader) {
    session.notice(format!(
        "An error occurred whilst installing {}. Please install manually.",
        loader
    ));
}

async fn cleanup(installer: &Path, log: &Path) {
    for path in [installer, log] {
        if let Err(e) = remove_if_exists(path).await {
            warn!("Unable to remove {}: {}", path.display(), e);
        }
    }
}
