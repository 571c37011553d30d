//! Forge server installer conventions

use std::ffi::OsString;
use std::path::Path;

use super::ArtifactConvention;

pub(crate) const KIND: &str = "forge";

/// Server jar names left by the Forge installer, preferred first.
///
/// | suffix       | produced by          |
/// |--------------|----------------------|
/// | `-universal` | legacy installers    |
/// | (none)       | later installers     |
pub const FORGE_ARTIFACTS: &[ArtifactConvention] = &[
    ArtifactConvention { suffix: "-universal" },
    ArtifactConvention { suffix: "" },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeLoader {
    pub game_version: String,
    pub version: String,
}

impl ForgeLoader {
    pub fn new(game_version: &str, version: &str) -> Self {
        Self {
            game_version: game_version.to_string(),
            version: version.to_string(),
        }
    }

    pub fn artifact_name(&self, convention: &ArtifactConvention) -> String {
        format!("forge-{}-{}{}.jar", self.game_version, self.version, convention.suffix)
    }

    pub fn artifact_names(&self) -> Vec<String> {
        FORGE_ARTIFACTS.iter().map(|c| self.artifact_name(c)).collect()
    }

    pub fn installer_arguments(installer: &Path, install_root: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-jar"),
            installer.as_os_str().to_os_string(),
            OsString::from("--installServer"),
            install_root.as_os_str().to_os_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::Modloader;
    use crate::manifest::ModloaderTarget;
    use tempfile::tempdir;

    fn forge() -> Modloader {
        let target = ModloaderTarget { kind: "forge".into(), version: "47.2.0".into() };
        Modloader::from_target(&target, "1.20.1").unwrap()
    }

    #[test]
    fn test_artifact_names_follow_convention_order() {
        assert_eq!(
            forge().artifact_names(),
            vec!["forge-1.20.1-47.2.0-universal.jar", "forge-1.20.1-47.2.0.jar"]
        );
    }

    #[test]
    fn test_unknown_loader_is_unsupported() {
        let target = ModloaderTarget { kind: "fabric".into(), version: "0.15.0".into() };
        assert!(Modloader::from_target(&target, "1.20.1").is_none());
    }

    #[test]
    fn test_loader_kind_is_case_insensitive() {
        let target = ModloaderTarget { kind: "Forge".into(), version: "47.2.0".into() };
        assert_eq!(Modloader::from_target(&target, "1.20.1").map(|m| m.kind()), Some("forge"));
    }

    #[test]
    fn test_probe_prefers_universal_artifact() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("forge-1.20.1-47.2.0.jar"), b"plain").unwrap();
        std::fs::write(dir.path().join("forge-1.20.1-47.2.0-universal.jar"), b"universal").unwrap();

        let found = forge().probe_artifact(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "forge-1.20.1-47.2.0-universal.jar");
    }

    #[test]
    fn test_probe_without_artifacts() {
        let dir = tempdir().unwrap();
        assert!(forge().probe_artifact(dir.path()).is_none());
    }

    #[test]
    fn test_installer_arguments() {
        let args = forge().installer_arguments(Path::new("forge-installer.jar"), Path::new("/srv/pack"));
        assert_eq!(args, vec!["-jar", "forge-installer.jar", "--installServer", "/srv/pack"]);
    }
}
