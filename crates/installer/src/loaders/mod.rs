//! Modloader support
//!
//! Each supported loader is one variant of [`Modloader`]. The variant knows
//! how its installer is invoked and which runnable artifact the installer
//! leaves behind, so the install flow never branches on loader names.

pub mod forge;
pub mod lookup;

pub use forge::ForgeLoader;
pub use lookup::{ForgeMavenLookup, InstallerLookup};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::manifest::ModloaderTarget;

/// One naming convention for the artifact an installer produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactConvention {
    pub suffix: &'static str,
}

/// Supported modloaders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modloader {
    Forge(ForgeLoader),
}

impl Modloader {
    /// Pick the loader implementation for a manifest target, `None` when unsupported
    pub fn from_target(target: &ModloaderTarget, game_version: &str) -> Option<Self> {
        match target.kind.to_ascii_lowercase().as_str() {
            forge::KIND => Some(Self::Forge(ForgeLoader::new(game_version, &target.version))),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Modloader::Forge(_) => forge::KIND,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Modloader::Forge(f) => &f.version,
        }
    }

    pub fn game_version(&self) -> &str {
        match self {
            Modloader::Forge(f) => &f.game_version,
        }
    }

    /// Candidate artifact names in probe order
    pub fn artifact_names(&self) -> Vec<String> {
        match self {
            Modloader::Forge(f) => f.artifact_names(),
        }
    }

    /// Arguments passed to the Java executable to run the installer unattended
    pub fn installer_arguments(&self, installer: &Path, install_root: &Path) -> Vec<OsString> {
        match self {
            Modloader::Forge(_) => ForgeLoader::installer_arguments(installer, install_root),
        }
    }

    /// First artifact from the convention table that exists in `dir`
    pub fn probe_artifact(&self, dir: &Path) -> Option<PathBuf> {
        self.artifact_names()
            .into_iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

impl std::fmt::Display for Modloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.version())
    }
}
