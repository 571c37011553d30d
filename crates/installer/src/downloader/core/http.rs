//! HTTP implementation of the per-file download capability
//!
//! Streams the body to a `.part` file next to the destination, renames it
//! into place once complete and then checks size and checksum.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use super::files::{atomic_rename, create_temp_path, ensure_parent_dir, remove_if_exists};
use super::{DownloadError, FileFetcher, FileOperation, Result};
use crate::downloader::config::DownloadConfig;
use crate::manifest::FileEntry;

/// Fetches manifest files over HTTP(S)
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &DownloadConfig) -> Result<Self> {
        Ok(Self::new(config.build_client()?))
    }

    /// Stream `url` into `dest_path`, returning the number of bytes written
    async fn download_to_file(&self, url: &str, dest_path: &Path) -> Result<u64> {
        debug!("Stream downloading: {} to {}", url, dest_path.display());

        ensure_parent_dir(dest_path).await?;
        let temp_path = create_temp_path(dest_path);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let file = fs::File::create(&temp_path)
            .await
            .map_err(|e| DownloadError::file_system(&temp_path, FileOperation::Create, e))?;

        let downloaded = match write_body(response, file, &temp_path).await {
            Ok(downloaded) => downloaded,
            Err(e) => {
                let _ = remove_if_exists(&temp_path).await;
                return Err(e);
            }
        };

        atomic_rename(&temp_path, dest_path).await?;

        debug!("Stream download completed: {} bytes", downloaded);
        Ok(downloaded)
    }
}

/// Stream the response body into `file`. The file is closed on return.
async fn write_body(response: reqwest::Response, mut file: fs::File, temp_path: &Path) -> Result<u64> {
    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::file_system(temp_path, FileOperation::Write, e))?;
        downloaded += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| DownloadError::file_system(temp_path, FileOperation::Write, e))?;
    file.sync_all()
        .await
        .map_err(|e| DownloadError::file_system(temp_path, FileOperation::Write, e))?;
    Ok(downloaded)
}

#[async_trait]
impl FileFetcher for HttpFetcher {
    /// Normalise the URL; parsing percent-encodes characters such as spaces
    /// that appear unescaped in some published file names.
    async fn prepare(&self, entry: &mut FileEntry) -> Result<()> {
        let raw = entry.url.trim();
        if raw.is_empty() {
            return Err(DownloadError::MissingUrl { name: entry.name.clone() });
        }

        let parsed = Url::parse(raw).map_err(|source| DownloadError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;
        entry.url = parsed.to_string();
        Ok(())
    }

    async fn fetch(&self, entry: &FileEntry, dest: &Path) -> Result<u64> {
        let written = self.download_to_file(&entry.url, dest).await?;

        let validation = entry.validation();
        if validation.is_empty() {
            return Ok(written);
        }

        match validation.validate_file(dest).await {
            Ok(size) => Ok(size),
            Err(e) => {
                debug!("Validation failed for {}: {}", dest.display(), e);
                remove_if_exists(dest).await?;
                Err(e)
            }
        }
    }
}
