//! Target resolution: game version, modloader and installer location

use tracing::{debug, info};

use crate::loaders::{InstallerLookup, Modloader};
use crate::manifest::error::Result;
use crate::manifest::model::{FileEntry, ModloaderTarget, PackVersion, Target};

const GAME_TARGET: &str = "game";
const MODLOADER_TARGET: &str = "modloader";

/// Copy the `game` and `modloader` targets onto the pack.
/// Later entries of the same type overwrite earlier ones.
pub fn apply_targets(pack: &mut PackVersion, targets: &[Target]) {
    for target in targets {
        match target.kind.as_str() {
            GAME_TARGET => pack.game_version = Some(target.version.clone()),
            MODLOADER_TARGET => {
                pack.modloader = Some(ModloaderTarget {
                    kind: target.name.clone(),
                    version: target.version.clone(),
                })
            }
            other => debug!("Ignoring '{}' target {} {}", other, target.name, target.version),
        }
    }
}

/// Outcome of looking up the modloader installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerResolution {
    /// The manifest names a loader this installer does not handle
    Unsupported { kind: String, version: String },
    /// Supported loader, but no installer download was found
    NotFound { loader: Modloader },
    /// Installer entry appended to the pack's file list
    Queued { loader: Modloader, file_name: String },
}

impl InstallerResolution {
    pub fn loader(&self) -> Option<&Modloader> {
        match self {
            InstallerResolution::Unsupported { .. } => None,
            InstallerResolution::NotFound { loader } | InstallerResolution::Queued { loader, .. } => Some(loader),
        }
    }
}

/// Resolve the installer for the pack's modloader and queue it for download.
///
/// Fails only when the manifest lacks the game or modloader target; a
/// missing installer is reported through [`InstallerResolution::NotFound`].
pub async fn resolve_installer<L>(pack: &mut PackVersion, lookup: &L) -> Result<InstallerResolution>
where
    L: InstallerLookup + ?Sized,
{
    let target = pack.require_modloader()?.clone();
    let game_version = pack.game_version()?.to_string();

    let Some(loader) = Modloader::from_target(&target, &game_version) else {
        return Ok(InstallerResolution::Unsupported {
            kind: target.kind,
            version: target.version,
        });
    };

    let Some(url) = lookup.find_installer(&loader).await else {
        return Ok(InstallerResolution::NotFound { loader });
    };

    let file_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}-{}-installer.jar", loader.kind(), loader.version()));

    info!("Resolved {} installer: {}", loader, url);
    pack.files
        .push(FileEntry::modloader_installer(loader.version(), url.as_str(), &file_name));

    Ok(InstallerResolution::Queued { loader, file_name })
}
