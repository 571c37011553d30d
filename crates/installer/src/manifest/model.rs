//! In-memory model of a pack version manifest

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::downloader::core::{FileValidation, HashAlgorithm};
use crate::manifest::error::{ManifestError, Result};

/// Category tag carried by the synthesized modloader installer entry
pub const MODLOADER_CATEGORY: &str = "modloader";

/// Manifest document exactly as served by the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub specs: Specs,
    pub targets: Vec<Target>,
    pub files: Vec<FileEntry>,
}

/// Hand-written manifest for a pack that is not published.
///
/// Only `name`, `type`, `targets` and `files` are required; missing memory
/// requirements fall back to [`Specs::default`].
#[derive(Debug, Clone, Deserialize)]
pub struct LocalManifestDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub specs: Specs,
    pub targets: Vec<Target>,
    pub files: Vec<FileEntry>,
}

impl From<LocalManifestDocument> for ManifestDocument {
    fn from(local: LocalManifestDocument) -> Self {
        Self {
            name: local.name,
            kind: local.kind,
            specs: local.specs,
            targets: local.targets,
            files: local.files,
        }
    }
}

/// Memory requirements in megabytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Specs {
    pub minimum: u64,
    pub recommended: u64,
}

impl Default for Specs {
    fn default() -> Self {
        Self {
            minimum: 2048,
            recommended: 4096,
        }
    }
}

/// One entry of the manifest's `targets` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    pub version: String,
}

/// Modloader identity resolved from the targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModloaderTarget {
    /// Loader type string as published, e.g. `forge`
    pub kind: String,
    pub version: String,
}

/// A file to place on disk
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileEntry {
    #[serde(default)]
    pub version: String,
    /// Destination directory relative to the install root
    pub path: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "sha1", alias = "hash", default)]
    pub hash: Option<String>,
    /// Declared size; the catalog uses negative values for "unknown"
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(rename = "clientonly", default)]
    pub client_only: bool,
    pub name: String,
    #[serde(rename = "type", default)]
    pub category: String,
    /// Identifier selecting the checksum algorithm, SHA-1 when absent
    #[serde(rename = "hashType", default, skip_serializing_if = "Option::is_none")]
    pub hash_type: Option<String>,
}

impl FileEntry {
    /// Entry for a modloader installer resolved outside the manifest
    pub fn modloader_installer(version: &str, url: &str, name: &str) -> Self {
        Self {
            version: version.to_string(),
            path: "./".to_string(),
            url: url.to_string(),
            hash: None,
            size: None,
            client_only: false,
            name: name.to_string(),
            category: MODLOADER_CATEGORY.to_string(),
            hash_type: None,
        }
    }

    pub fn is_server_side(&self) -> bool {
        !self.client_only
    }

    pub fn is_modloader(&self) -> bool {
        self.category == MODLOADER_CATEGORY
    }

    pub fn declared_size(&self) -> Option<u64> {
        self.size.and_then(|s| u64::try_from(s).ok())
    }

    pub fn checksum_algorithm(&self) -> HashAlgorithm {
        self.hash_type
            .as_deref()
            .map(HashAlgorithm::from_identifier)
            .unwrap_or_default()
    }

    /// What the fetched file must match
    pub fn validation(&self) -> FileValidation {
        let mut validation = FileValidation::new();
        if let Some(hash) = self.hash.as_deref().filter(|h| !h.trim().is_empty()) {
            validation = validation.with_hash(self.checksum_algorithm(), hash);
        }
        if let Some(size) = self.declared_size() {
            validation = validation.with_expected_size(size);
        }
        validation
    }

    /// Destination directory under `root`, or `None` when the entry lands in the root itself
    pub fn destination_dir(&self, root: &Path) -> Option<PathBuf> {
        let relative = normalize_relative(&self.path);
        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(root.join(relative))
        }
    }

    /// Full destination path of the file under `root`
    pub fn destination(&self, root: &Path) -> PathBuf {
        self.destination_dir(root)
            .unwrap_or_else(|| root.to_path_buf())
            .join(&self.name)
    }
}

/// Strip `.` components and leading separators so a manifest path can
/// only point inside the install root
fn normalize_relative(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// A pack version ready for installation
#[derive(Debug, Clone)]
pub struct PackVersion {
    pub pack_id: u64,
    pub version_id: u64,
    pub name: String,
    pub kind: String,
    pub minimum_ram: u64,
    pub recommended_ram: u64,
    pub game_version: Option<String>,
    pub modloader: Option<ModloaderTarget>,
    pub files: Vec<FileEntry>,
    /// Manifest text as received, persisted next to the installation
    pub raw_manifest: String,
}

impl PackVersion {
    pub fn game_version(&self) -> Result<&str> {
        self.game_version
            .as_deref()
            .ok_or(ManifestError::MissingTarget("game"))
    }

    /// Modloader type and version, both of which must be present
    pub fn require_modloader(&self) -> Result<&ModloaderTarget> {
        match &self.modloader {
            Some(target) if !target.kind.is_empty() && !target.version.is_empty() => Ok(target),
            _ => Err(ManifestError::MissingModloader),
        }
    }

    /// Entries that belong on a server
    pub fn server_files(&self) -> impl Iterator<Item = &FileEntry> {
        self.files.iter().filter(|f| f.is_server_side())
    }
}
