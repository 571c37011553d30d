//! Installer download location lookup

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::Modloader;

pub const FORGE_MAVEN: &str = "https://maven.minecraftforge.net/net/minecraftforge/forge";

/// Maps a modloader to the URL of its installer, when one can be found
#[async_trait]
pub trait InstallerLookup: Send + Sync {
    async fn find_installer(&self, loader: &Modloader) -> Option<Url>;
}

/// Probes the Forge maven for an installer jar
pub struct ForgeMavenLookup {
    client: Client,
    base: String,
}

impl ForgeMavenLookup {
    pub fn new(client: Client) -> Self {
        Self::with_base(client, FORGE_MAVEN)
    }

    pub fn with_base<S: Into<String>>(client: Client, base: S) -> Self {
        Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Maven coordinates the installer may be published under, tried in order.
    /// Old releases carry the game version a second time as a branch suffix.
    fn coordinates(game_version: &str, forge_version: &str) -> [String; 2] {
        [
            format!("{}-{}", game_version, forge_version),
            format!("{}-{}-{}", game_version, forge_version, game_version),
        ]
    }

    fn installer_url(&self, coordinate: &str) -> Option<Url> {
        let raw = format!("{}/{}/forge-{}-installer.jar", self.base, coordinate, coordinate);
        match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Skipping malformed installer URL '{}': {}", raw, e);
                None
            }
        }
    }

    async fn exists(&self, url: &Url) -> bool {
        match self.client.head(url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}

#[async_trait]
impl InstallerLookup for ForgeMavenLookup {
    async fn find_installer(&self, loader: &Modloader) -> Option<Url> {
        let Modloader::Forge(forge) = loader;

        for coordinate in Self::coordinates(&forge.game_version, &forge.version) {
            let Some(url) = self.installer_url(&coordinate) else {
                continue;
            };
            if self.exists(&url).await {
                debug!("Found Forge installer at {}", url);
                return Some(url);
            }
        }

        None
    }
}
