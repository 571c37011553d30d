//! Manifest retrieval from the catalog API or a local file

use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::manifest::error::{ManifestError, Result};
use crate::manifest::model::{LocalManifestDocument, ManifestDocument, PackVersion};
use crate::manifest::resolve::apply_targets;

pub const DEFAULT_API_BASE: &str = "https://api.modpacks.ch";

/// Where the manifest comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// `GET {api}/public/modpack/{pack}/{version}`
    Catalog { pack_id: u64, version_id: u64 },
    /// A manifest JSON file on disk, for packs that are not published
    LocalFile(PathBuf),
}

/// Error envelope the catalog returns in place of a manifest
#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Identifiers carried by local manifests
#[derive(Debug, Default, Deserialize)]
struct LocalIds {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    parent: u64,
}

/// Client for the modpack catalog
pub struct CatalogClient {
    client: Client,
    api_base: Url,
}

impl CatalogClient {
    pub fn new(client: Client) -> Result<Self> {
        Self::with_base(client, DEFAULT_API_BASE)
    }

    pub fn with_base(client: Client, api_base: &str) -> Result<Self> {
        let mut api_base = Url::parse(api_base)?;
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        Ok(Self { client, api_base })
    }

    pub fn manifest_url(&self, pack_id: u64, version_id: u64) -> Result<Url> {
        Ok(self
            .api_base
            .join(&format!("public/modpack/{}/{}", pack_id, version_id))?)
    }

    /// Load and parse a manifest from either source
    pub async fn load(&self, source: &ManifestSource) -> Result<PackVersion> {
        match source {
            ManifestSource::Catalog { pack_id, version_id } => {
                self.fetch_pack_version(*pack_id, *version_id).await
            }
            ManifestSource::LocalFile(path) => {
                let body = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ManifestError::Read { path: path.clone(), source })?;
                info!("Loaded local manifest {}", path.display());
                parse_local_manifest(body)
            }
        }
    }

    /// Fetch one pack version from the catalog
    pub async fn fetch_pack_version(&self, pack_id: u64, version_id: u64) -> Result<PackVersion> {
        let url = self.manifest_url(pack_id, version_id)?;
        debug!("Fetching manifest from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ManifestError::Request { url: url.to_string(), source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ManifestError::Request { url: url.to_string(), source })?;

        // The catalog reports unknown packs as a JSON error envelope, sometimes with a 200
        check_envelope(&body)?;

        if !status.is_success() {
            return Err(ManifestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        parse_manifest(pack_id, version_id, body)
    }
}

fn check_envelope(body: &str) -> Result<()> {
    if let Ok(envelope) = serde_json::from_str::<StatusEnvelope>(body) {
        if envelope.status.as_deref() == Some("error") {
            return Err(ManifestError::Catalog {
                message: envelope.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
    }
    Ok(())
}

/// Parse a catalog manifest document and resolve its targets
pub fn parse_manifest(pack_id: u64, version_id: u64, body: String) -> Result<PackVersion> {
    check_envelope(&body)?;
    let document: ManifestDocument = serde_json::from_str(&body)?;
    Ok(build_pack_version(pack_id, version_id, document, body))
}

/// Parse a local manifest, taking its ids from the document when present
pub fn parse_local_manifest(body: String) -> Result<PackVersion> {
    let document: LocalManifestDocument = serde_json::from_str(&body)?;
    let ids = match serde_json::from_str::<LocalIds>(&body) {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Ignoring unreadable pack ids in local manifest: {}", e);
            LocalIds::default()
        }
    };
    Ok(build_pack_version(ids.parent, ids.id, document.into(), body))
}

fn build_pack_version(pack_id: u64, version_id: u64, document: ManifestDocument, body: String) -> PackVersion {
    let mut pack = PackVersion {
        pack_id,
        version_id,
        name: document.name,
        kind: document.kind,
        minimum_ram: document.specs.minimum,
        recommended_ram: document.specs.recommended,
        game_version: None,
        modloader: None,
        files: document.files,
        raw_manifest: body,
    };
    apply_targets(&mut pack, &document.targets);

    debug!(
        "Parsed manifest '{}' ({}): {} files, game {:?}, modloader {:?}",
        pack.name,
        pack.kind,
        pack.files.len(),
        pack.game_version,
        pack.modloader
    );
    pack
}
