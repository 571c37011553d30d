//! Configuration types for the downloader

use std::time::Duration;

/// Configuration for download operations
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Per-request timeout, including the body transfer
    pub timeout: Duration,
    pub user_agent: String,
    /// Upper bound on simultaneously running downloads
    pub max_concurrent_downloads: usize,
}

impl DownloadConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Zero is treated as one so a batch always makes progress
    pub fn with_max_concurrent_downloads(mut self, max: usize) -> Self {
        self.max_concurrent_downloads = max.max(1);
        self
    }

    /// Build a reqwest client carrying this configuration
    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            user_agent: concat!("serverpack-installer/", env!("CARGO_PKG_VERSION")).to_string(),
            max_concurrent_downloads: 8,
        }
    }
}
