//! Pack version manifests
//!
//! Fetching and parsing the catalog's manifest document, and resolving the
//! targets it declares into the game version, the modloader and the
//! modloader installer download.

pub mod error;
pub mod fetch;
pub mod model;
pub mod resolve;

pub use error::{ManifestError, Result};
pub use fetch::{parse_local_manifest, parse_manifest, CatalogClient, ManifestSource, DEFAULT_API_BASE};
pub use model::{FileEntry, LocalManifestDocument, ModloaderTarget, PackVersion, Specs, Target, MODLOADER_CATEGORY};
pub use resolve::{apply_targets, resolve_installer, InstallerResolution};
