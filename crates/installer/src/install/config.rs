//! Installation configuration

use std::path::PathBuf;

use crate::downloader::DownloadConfig;
use crate::loaders::lookup::FORGE_MAVEN;
use crate::manifest::DEFAULT_API_BASE;

/// Installation configuration
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Directory the pack is installed into
    pub install_root: PathBuf,
    /// Directory receiving `start.sh` and `start.bat`
    pub script_dir: PathBuf,
    /// Java executable used to run the modloader installer
    pub java_command: String,
    pub generate_start_scripts: bool,
    /// Stop before the modloader install when any download failed
    pub abort_on_download_failure: bool,
    pub api_base: String,
    /// Maven repository probed for Forge installers
    pub forge_maven: String,
    pub download: DownloadConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from("."),
            script_dir: PathBuf::from("."),
            java_command: "java".to_string(),
            generate_start_scripts: false,
            abort_on_download_failure: false,
            api_base: DEFAULT_API_BASE.to_string(),
            forge_maven: FORGE_MAVEN.to_string(),
            download: DownloadConfig::default(),
        }
    }
}

impl InstallerConfig {
    pub fn with_install_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.install_root = path.into();
        self
    }

    pub fn with_script_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.script_dir = path.into();
        self
    }

    pub fn with_java_command<S: Into<String>>(mut self, java: S) -> Self {
        self.java_command = java.into();
        self
    }

    pub fn with_start_scripts(mut self, generate: bool) -> Self {
        self.generate_start_scripts = generate;
        self
    }

    pub fn with_strict_downloads(mut self, strict: bool) -> Self {
        self.abort_on_download_failure = strict;
        self
    }

    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_forge_maven<S: Into<String>>(mut self, base: S) -> Self {
        self.forge_maven = base.into();
        self
    }

    pub fn with_download_config(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }
}
