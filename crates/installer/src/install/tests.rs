//! Unit tests for the install module

use super::*;
use crate::downloader::{
    BatchReport, DownloadConfig, DownloadError, DownloadOutcome, HttpFetcher, InstallSession,
    ProgressCallback, ProgressEvent,
};
use crate::loaders::{ForgeLoader, InstallerLookup, Modloader};
use crate::manifest::{CatalogClient, InstallerResolution, ManifestError, ManifestSource};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use url::Url;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const INSTALLER: &str = "forge-1.20.1-47.2.0-installer.jar";

/// Collects notices emitted during a run
#[derive(Default)]
struct NoticeCapture {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl NoticeCapture {
    fn get_callback(&self) -> ProgressCallback {
        let events = self.events.clone();
        Arc::new(move |event| events.lock().unwrap().push(event))
    }

    fn notices(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Notice { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn has_notice(&self, text: &str) -> bool {
        self.notices().iter().any(|n| n == text)
    }
}

fn forge() -> Modloader {
    Modloader::Forge(ForgeLoader::new("1.20.1", "47.2.0"))
}

fn queued() -> InstallerResolution {
    InstallerResolution::Queued { loader: forge(), file_name: INSTALLER.to_string() }
}

fn report_with_installer(root: &Path, downloaded: bool) -> BatchReport {
    let result = if downloaded {
        Ok(4)
    } else {
        Err(DownloadError::HttpStatus { url: "https://maven.example/x".to_string(), status: 404 })
    };
    BatchReport {
        outcomes: vec![DownloadOutcome {
            name: INSTALLER.to_string(),
            destination: root.join(INSTALLER),
            is_modloader: true,
            result,
        }],
        completed: 1,
        total: 1,
        duration: Duration::ZERO,
    }
}

async fn place_installer(root: &Path) {
    tokio::fs::write(root.join(INSTALLER), b"jar!").await.unwrap();
    tokio::fs::write(root.join(format!("{}.log", INSTALLER)), b"log").await.unwrap();
}

#[cfg(test)]
mod invoker_tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_artifact_keeps_installer() {
        let dir = tempdir().unwrap();
        place_installer(dir.path()).await;
        let capture = NoticeCapture::default();
        let session = InstallSession::new(dir.path(), 1).with_progress(Some(capture.get_callback()));

        let mut invoker = InstallerInvoker::new("true", &queued());
        assert_eq!(invoker.state(), InstallerState::Downloading);
        let state = invoker
            .run(&session, &queued(), &report_with_installer(dir.path(), true))
            .await;

        assert_eq!(state, InstallerState::FailedCleanupSkipped);
        assert!(dir.path().join(INSTALLER).exists());
        assert!(dir.path().join(format!("{}.log", INSTALLER)).exists());
        assert!(capture.has_notice("An error occurred whilst installing forge 47.2.0. Please install manually."));
        assert!(capture.has_notice("================= FORGE INSTALL BEGINS ================="));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_artifact_present_cleans_up() {
        let dir = tempdir().unwrap();
        place_installer(dir.path()).await;
        tokio::fs::write(dir.path().join("forge-1.20.1-47.2.0.jar"), b"server").await.unwrap();
        let session = InstallSession::new(dir.path(), 1);

        let mut invoker = InstallerInvoker::new("true", &queued());
        let state = invoker
            .run(&session, &queued(), &report_with_installer(dir.path(), true))
            .await;

        assert_eq!(state, InstallerState::Succeeded);
        assert!(state.is_terminal());
        assert!(!dir.path().join(INSTALLER).exists());
        assert!(!dir.path().join(format!("{}.log", INSTALLER)).exists());
        assert!(dir.path().join("forge-1.20.1-47.2.0.jar").exists());
    }

    #[tokio::test]
    async fn test_spawn_failure_skips_cleanup() {
        let dir = tempdir().unwrap();
        place_installer(dir.path()).await;
        tokio::fs::write(dir.path().join("forge-1.20.1-47.2.0.jar"), b"server").await.unwrap();
        let session = InstallSession::new(dir.path(), 1);

        let mut invoker = InstallerInvoker::new("definitely-not-a-java-binary", &queued());
        let state = invoker
            .run(&session, &queued(), &report_with_installer(dir.path(), true))
            .await;

        assert_eq!(state, InstallerState::FailedCleanupSkipped);
        assert!(dir.path().join(INSTALLER).exists());
    }

    #[tokio::test]
    async fn test_failed_installer_download_is_not_invoked() {
        let dir = tempdir().unwrap();
        let capture = NoticeCapture::default();
        let session = InstallSession::new(dir.path(), 1).with_progress(Some(capture.get_callback()));

        let mut invoker = InstallerInvoker::new("definitely-not-a-java-binary", &queued());
        let state = invoker
            .run(&session, &queued(), &report_with_installer(dir.path(), false))
            .await;

        assert_eq!(state, InstallerState::FailedCleanupSkipped);
        assert!(!capture.notices().iter().any(|n| n.contains("INSTALL BEGINS")));
    }

    #[tokio::test]
    async fn test_unresolved_installer_is_not_applicable() {
        let dir = tempdir().unwrap();
        let capture = NoticeCapture::default();
        let session = InstallSession::new(dir.path(), 0).with_progress(Some(capture.get_callback()));
        let resolution = InstallerResolution::NotFound { loader: forge() };

        let mut invoker = InstallerInvoker::new("java", &resolution);
        let state = invoker
            .run(&session, &resolution, &report_with_installer(dir.path(), true))
            .await;

        assert_eq!(state, InstallerState::NotApplicable);
        assert!(capture.has_notice("Could not find download location for forge 47.2.0. Please install manually."));
    }

    #[tokio::test]
    async fn test_unsupported_loader_notice() {
        let dir = tempdir().unwrap();
        let capture = NoticeCapture::default();
        let session = InstallSession::new(dir.path(), 0).with_progress(Some(capture.get_callback()));
        let resolution = InstallerResolution::Unsupported { kind: "fabric".into(), version: "0.15.0".into() };

        let state = InstallerInvoker::new("java", &resolution)
            .run(&session, &resolution, &report_with_installer(dir.path(), true))
            .await;

        assert_eq!(state, InstallerState::NotApplicable);
        assert!(capture.notices()[0].starts_with("Modloader type fabric is not currently supported."));
    }
}

#[cfg(test)]
mod script_tests {
    use super::*;

    fn command(dir: &Path) -> StartCommand {
        StartCommand::resolve(Some(&forge()), dir, dir, 2048, 4096)
    }

    #[test]
    fn test_java_arguments_embed_memory() {
        let dir = tempdir().unwrap();
        let args = command(dir.path()).java_arguments();

        assert!(args.contains("-Xmx4096M -Xms2048M"));
        assert!(args.starts_with("-server -XX:+UseG1GC"));
        assert!(args.ends_with("nogui"));
    }

    #[test]
    fn test_artifact_probe_prefers_universal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("forge-1.20.1-47.2.0.jar"), b"").unwrap();
        std::fs::write(dir.path().join("forge-1.20.1-47.2.0-universal.jar"), b"").unwrap();

        assert_eq!(command(dir.path()).artifact, "forge-1.20.1-47.2.0-universal.jar");
    }

    #[test]
    fn test_missing_artifact_falls_back_to_modern_name() {
        let dir = tempdir().unwrap();
        assert_eq!(command(dir.path()).artifact, "forge-1.20.1-47.2.0.jar");
    }

    #[test]
    fn test_scripts_change_directory_when_separate() {
        let root = tempdir().unwrap();
        let scripts = tempdir().unwrap();
        let command = StartCommand::resolve(Some(&forge()), root.path(), scripts.path(), 1024, 2048);

        assert!(command.posix_script().contains(&format!("cd \"{}\"", root.path().display())));
        assert!(command.windows_script().contains("cd /d"));
        assert!(!command.windows_script().contains("\n\n"));
    }

    #[tokio::test]
    async fn test_writes_both_scripts() {
        let dir = tempdir().unwrap();
        let written = write_start_scripts(dir.path(), &command(dir.path())).await;

        assert_eq!(written.len(), 2);
        let sh = tokio::fs::read_to_string(dir.path().join(POSIX_SCRIPT)).await.unwrap();
        let bat = tokio::fs::read_to_string(dir.path().join(WINDOWS_SCRIPT)).await.unwrap();
        assert!(sh.starts_with("#!/bin/bash\n"));
        assert!(sh.contains("minecraft_eula"));
        assert!(sh.contains("java -server"));
        assert!(bat.contains("java.exe -server"));
        assert!(bat.contains("\r\n"));
    }

    #[tokio::test]
    async fn test_existing_script_is_not_overwritten() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join(POSIX_SCRIPT), b"custom").await.unwrap();

        let written = write_start_scripts(dir.path(), &command(dir.path())).await;

        assert_eq!(written, vec![dir.path().join(WINDOWS_SCRIPT)]);
        assert_eq!(
            tokio::fs::read_to_string(dir.path().join(POSIX_SCRIPT)).await.unwrap(),
            "custom"
        );
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_logged_only() {
        let written = write_start_scripts(Path::new("/nonexistent/scripts"), &command(Path::new("."))).await;
        assert!(written.is_empty());
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    /// Lookup returning a fixed answer
    struct FixedLookup(Option<Url>);

    #[async_trait]
    impl InstallerLookup for FixedLookup {
        async fn find_installer(&self, _loader: &Modloader) -> Option<Url> {
            self.0.clone()
        }
    }

    async fn serve_file(server: &MockServer, route: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(server)
            .await;
    }

    /// Catalog plus file host for the standard four-file pack
    async fn setup_pack_server() -> MockServer {
        let server = MockServer::start().await;
        let base = server.uri();
        let manifest = json!({
            "id": 100,
            "parent": 99,
            "name": "1.2.0",
            "type": "release",
            "specs": { "id": 1, "minimum": 2048, "recommended": 4096 },
            "targets": [
                { "type": "game", "name": "minecraft", "version": "1.20.1" },
                { "type": "modloader", "name": "forge", "version": "47.2.0" }
            ],
            "files": [
                { "version": "1", "path": "./mods/", "url": format!("{}/files/a.jar", base), "sha1": "", "size": 1, "clientonly": false, "name": "a.jar", "type": "mod" },
                { "version": "1", "path": "./mods/", "url": format!("{}/files/b.jar", base), "sha1": "", "size": 1, "clientonly": false, "name": "b.jar", "type": "mod" },
                { "version": "1", "path": "./config/", "url": format!("{}/files/c.cfg", base), "sha1": "", "size": 1, "clientonly": false, "name": "c.cfg", "type": "config" },
                { "version": "1", "path": "./mods/", "url": format!("{}/files/shaders.jar", base), "sha1": "", "size": 1, "clientonly": true, "name": "shaders.jar", "type": "mod" }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/public/modpack/99/100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(manifest.to_string()))
            .mount(&server)
            .await;
        serve_file(&server, "/files/a.jar", b"a").await;
        serve_file(&server, "/files/c.cfg", b"c").await;
        server
    }

    fn installer(
        server: &MockServer,
        config: InstallerConfig,
        lookup: FixedLookup,
    ) -> PackInstaller<FixedLookup, HttpFetcher> {
        let catalog = CatalogClient::with_base(Client::new(), &server.uri()).unwrap();
        let fetcher = HttpFetcher::from_config(&DownloadConfig::default()).unwrap();
        PackInstaller::with_parts(config, catalog, lookup, fetcher)
    }

    fn source() -> ManifestSource {
        ManifestSource::Catalog { pack_id: 99, version_id: 100 }
    }

    #[tokio::test]
    async fn test_missing_installer_still_installs_files() {
        let server = setup_pack_server().await;
        serve_file(&server, "/files/b.jar", b"b").await;
        let root = tempdir().unwrap();
        let scripts = tempdir().unwrap();
        let capture = NoticeCapture::default();

        let config = InstallerConfig::default()
            .with_install_root(root.path())
            .with_script_dir(scripts.path())
            .with_start_scripts(true);
        let summary = installer(&server, config, FixedLookup(None))
            .with_progress_callback(capture.get_callback())
            .install(&source())
            .await
            .unwrap();

        assert_eq!(summary.downloads.total, 3);
        assert!(summary.downloads.is_complete_success());
        assert_eq!(summary.installer_state, InstallerState::NotApplicable);
        assert!(root.path().join("mods/a.jar").exists());
        assert!(root.path().join("config/c.cfg").exists());
        assert!(!root.path().join("mods/shaders.jar").exists());
        assert!(root.path().join(VERSION_FILE).exists());
        assert_eq!(summary.scripts.len(), 2);
        let sh = tokio::fs::read_to_string(scripts.path().join(POSIX_SCRIPT)).await.unwrap();
        assert!(sh.contains("-Xmx4096M -Xms2048M"));
        assert!(capture.has_notice("Could not find download location for forge 47.2.0. Please install manually."));
        assert_eq!(capture.notices().last().map(String::as_str), Some("Pack install Finished."));
    }

    #[tokio::test]
    async fn test_partial_failure_continues_by_default() {
        let server = setup_pack_server().await;
        let root = tempdir().unwrap();

        let config = InstallerConfig::default().with_install_root(root.path());
        let summary = installer(&server, config, FixedLookup(None))
            .install(&source())
            .await
            .unwrap();

        assert_eq!(summary.downloads.completed, 3);
        assert_eq!(summary.downloads.failed_count(), 1);
        assert!(root.path().join("mods/a.jar").exists());
        assert!(summary.scripts.is_empty());
    }

    #[tokio::test]
    async fn test_strict_mode_stops_before_installer() {
        let server = setup_pack_server().await;
        let root = tempdir().unwrap();

        let config = InstallerConfig::default()
            .with_install_root(root.path())
            .with_strict_downloads(true);
        let result = installer(&server, config, FixedLookup(None)).install(&source()).await;

        match result {
            Err(InstallError::DownloadsFailed { failed, total }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
            }
            other => panic!("Expected DownloadsFailed, got {:?}", other.map(|s| s.pack_name)),
        }
        assert!(!root.path().join(VERSION_FILE).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_installer_downloaded_and_invoked() {
        let server = setup_pack_server().await;
        serve_file(&server, "/files/b.jar", b"b").await;
        serve_file(&server, &format!("/maven/{}", INSTALLER), b"jar!").await;
        let root = tempdir().unwrap();
        // Stands in for what the real installer would produce
        tokio::fs::write(root.path().join("forge-1.20.1-47.2.0.jar"), b"server").await.unwrap();

        let url = Url::parse(&format!("{}/maven/{}", server.uri(), INSTALLER)).unwrap();
        let config = InstallerConfig::default()
            .with_install_root(root.path())
            .with_java_command("true");
        let summary = installer(&server, config, FixedLookup(Some(url)))
            .install(&source())
            .await
            .unwrap();

        assert_eq!(summary.downloads.total, 4);
        assert!(summary.downloads.outcome_for(INSTALLER).unwrap().is_modloader);
        assert_eq!(summary.installer_state, InstallerState::Succeeded);
        assert!(!root.path().join(INSTALLER).exists());
    }

    #[tokio::test]
    async fn test_manifest_failure_touches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let parent = tempdir().unwrap();
        let root = parent.path().join("server");

        let config = InstallerConfig::default().with_install_root(&root);
        let result = installer(&server, config, FixedLookup(None)).install(&source()).await;

        assert!(matches!(result, Err(InstallError::Manifest(ManifestError::Status { .. }))));
        assert!(!root.exists());
    }

    /// Local manifest listing `files` as `(path, name)` pairs served from `server`
    fn local_manifest(server: &MockServer, name: &str, files: &[(&str, &str)]) -> String {
        let files: Vec<serde_json::Value> = files
            .iter()
            .map(|(dir, file)| {
                json!({ "path": dir, "url": format!("{}/files/{}", server.uri(), file), "name": file, "clientonly": false })
            })
            .collect();
        json!({
            "name": name,
            "type": "release",
            "targets": [
                { "type": "game", "name": "minecraft", "version": "1.20.1" },
                { "type": "modloader", "name": "forge", "version": "47.2.0" }
            ],
            "files": files
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_update_removes_files_dropped_from_pack() {
        let server = MockServer::start().await;
        for file in ["a.jar", "README.md", "old.zs", "NOTES.md"] {
            serve_file(&server, &format!("/files/{}", file), file.as_bytes()).await;
        }
        let root = tempdir().unwrap();
        let manifest = tempdir().unwrap();
        let manifest_file = manifest.path().join("modpack.json");
        let source = ManifestSource::LocalFile(manifest_file.clone());
        let config = InstallerConfig::default().with_install_root(root.path());

        let first = local_manifest(
            &server,
            "1.0.0",
            &[("./mods/", "a.jar"), ("./", "README.md"), ("./scripts/", "old.zs"), ("./", "NOTES.md")],
        );
        tokio::fs::write(&manifest_file, first).await.unwrap();
        installer(&server, config.clone(), FixedLookup(None)).install(&source).await.unwrap();
        assert!(root.path().join("README.md").exists());
        assert!(root.path().join("scripts/old.zs").exists());
        tokio::fs::write(root.path().join("server.properties"), b"motd=hi").await.unwrap();

        let second = local_manifest(&server, "1.1.0", &[("./mods/", "a.jar"), ("./", "NOTES.md")]);
        tokio::fs::write(&manifest_file, second).await.unwrap();
        let capture = NoticeCapture::default();
        let summary = installer(&server, config, FixedLookup(None))
            .with_progress_callback(capture.get_callback())
            .install(&source)
            .await
            .unwrap();

        assert!(summary.downloads.is_complete_success());
        assert!(capture.has_notice("Installing 1.1.0 release as an update of 1.0.0."));
        assert!(!root.path().join("README.md").exists());
        assert!(!root.path().join("scripts").exists());
        assert!(root.path().join("NOTES.md").exists());
        assert!(root.path().join("mods/a.jar").exists());
        assert!(root.path().join("server.properties").exists());
        let version = tokio::fs::read_to_string(root.path().join(VERSION_FILE)).await.unwrap();
        assert!(version.contains("1.1.0"));
    }

    #[tokio::test]
    async fn test_fresh_install_is_not_an_update() {
        let server = setup_pack_server().await;
        let root = tempdir().unwrap();
        let capture = NoticeCapture::default();

        let config = InstallerConfig::default().with_install_root(root.path());
        installer(&server, config, FixedLookup(None))
            .with_progress_callback(capture.get_callback())
            .install(&source())
            .await
            .unwrap();

        assert!(!capture.notices().iter().any(|n| n.contains("as an update")));
    }
}

#[cfg(test)]
mod update_tests {
    use super::*;
    use crate::manifest::parse_local_manifest;

    fn pack(name: &str, files: &[(&str, &str)]) -> crate::manifest::PackVersion {
        let files: Vec<serde_json::Value> = files
            .iter()
            .map(|(dir, file)| json!({ "path": dir, "url": "https://cdn.example/x", "name": file }))
            .collect();
        let body = json!({ "name": name, "type": "release", "targets": [], "files": files });
        parse_local_manifest(body.to_string()).unwrap()
    }

    #[test]
    fn test_only_files_outside_cleared_directories_are_dropped() {
        let root = Path::new("/srv/pack");
        let previous = pack(
            "1.0.0",
            &[("./", "README.md"), ("./mods/", "gone.jar"), ("./scripts/", "old.zs"), ("./", "keep.txt")],
        );
        let current = pack("1.1.0", &[("./mods/", "a.jar"), ("./", "keep.txt")]);

        // mods/ is cleared by the batch, so gone.jar needs no separate removal
        assert_eq!(
            dropped_files(root, &previous, &current),
            vec![root.join("README.md"), root.join("scripts/old.zs")]
        );
    }

    #[tokio::test]
    async fn test_missing_version_file_means_fresh_install() {
        let root = tempdir().unwrap();
        assert!(read_previous_install(root.path()).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_version_file_is_ignored() {
        let root = tempdir().unwrap();
        tokio::fs::write(root.path().join(VERSION_FILE), b"{ truncated").await.unwrap();

        assert!(read_previous_install(root.path()).await.is_none());
    }

    #[tokio::test]
    async fn test_already_deleted_files_are_skipped() {
        let root = tempdir().unwrap();
        tokio::fs::write(root.path().join("README.md"), b"docs").await.unwrap();
        let previous = pack("1.0.0", &[("./", "README.md"), ("./", "LICENSE")]);
        let current = pack("1.1.0", &[]);

        let removed = remove_dropped_files(root.path(), &previous, &current).await;

        assert_eq!(removed, vec![root.path().join("README.md")]);
        assert!(!root.path().join("README.md").exists());
    }
}
