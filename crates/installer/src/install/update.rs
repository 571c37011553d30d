//! Installing over a previous version of the pack
//!
//! A previous install leaves its manifest in `version.json`. Files it listed
//! that the new version drops are removed before the batch starts. Directories
//! the new version still uses are cleared by the batch itself, so only files
//! outside those directories need removing here.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::downloader::plan_directories;
use crate::install::pipeline::VERSION_FILE;
use crate::manifest::{parse_local_manifest, PackVersion};

/// Manifest of the install found in `root`, if any.
///
/// An unreadable `version.json` is logged and treated as a fresh install.
pub async fn read_previous_install(root: &Path) -> Option<PackVersion> {
    let version_file = root.join(VERSION_FILE);
    let body = match fs::read_to_string(&version_file).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Unable to read previous install {}: {}", version_file.display(), e);
            return None;
        }
    };

    match parse_local_manifest(body) {
        Ok(previous) => Some(previous),
        Err(e) => {
            warn!(
                "Previous install at {} is unreadable, installing fresh: {}",
                root.display(),
                e
            );
            None
        }
    }
}

/// Files of `previous` that `current` no longer ships and that the batch
/// will not clear along with their directory
pub fn dropped_files(root: &Path, previous: &PackVersion, current: &PackVersion) -> Vec<PathBuf> {
    let kept: HashSet<PathBuf> = current.server_files().map(|f| f.destination(root)).collect();
    let cleared: HashSet<PathBuf> = plan_directories(root, current.server_files()).into_iter().collect();

    let mut seen = HashSet::new();
    previous
        .server_files()
        .filter(|f| f.destination_dir(root).is_none_or(|dir| !cleared.contains(&dir)))
        .map(|f| f.destination(root))
        .filter(|dest| !kept.contains(dest) && seen.insert(dest.clone()))
        .collect()
}

/// Remove files dropped since `previous`, then any directory left empty.
/// Returns the files actually removed.
pub async fn remove_dropped_files(root: &Path, previous: &PackVersion, current: &PackVersion) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    for file in dropped_files(root, previous, current) {
        match fs::remove_file(&file).await {
            Ok(()) => {
                debug!("Removed {}", file.display());
                removed.push(file);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Error occurred whilst removing {}: {}", file.display(), e),
        }
    }

    for dir in removed.iter().filter_map(|f| f.parent()).collect::<HashSet<_>>() {
        if dir == root {
            continue;
        }
        // Fails harmlessly when something else still lives there
        if fs::remove_dir(dir).await.is_ok() {
            debug!("Removed {} as it is empty", dir.display());
        }
    }

    info!(
        "Update from {} removed {} files no longer in the pack",
        previous.name,
        removed.len()
    );
    removed
}
