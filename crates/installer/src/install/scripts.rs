//! Start scripts for the installed server

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::loaders::Modloader;

pub const POSIX_SCRIPT: &str = "start.sh";
pub const WINDOWS_SCRIPT: &str = "start.bat";

const EULA_PROMPT: &str =
    "Do you agree to the Mojang EULA available at https://account.mojang.com/documents/minecraft_eula ?";

/// What the scripts launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCommand {
    pub minimum_ram: u64,
    pub recommended_ram: u64,
    /// Server jar, relative to `working_dir`
    pub artifact: String,
    /// Directory the server runs in, when it is not the script directory
    pub working_dir: Option<PathBuf>,
}

impl StartCommand {
    /// Build the command for a finished install. The artifact is probed in
    /// `install_root`; without one the loader's preferred name is used.
    pub fn resolve(
        loader: Option<&Modloader>,
        install_root: &Path,
        script_dir: &Path,
        minimum_ram: u64,
        recommended_ram: u64,
    ) -> Self {
        let artifact = match loader {
            Some(loader) => match loader.probe_artifact(install_root) {
                Some(path) => file_name(&path),
                None => {
                    let fallback = loader.artifact_names().pop().unwrap_or_default();
                    warn!("No {} server jar found, start scripts will launch {}", loader, fallback);
                    fallback
                }
            },
            None => {
                warn!("No supported modloader, start scripts will launch server.jar");
                "server.jar".to_string()
            }
        };

        let working_dir = if same_dir(install_root, script_dir) {
            None
        } else {
            Some(install_root.to_path_buf())
        };

        Self { minimum_ram, recommended_ram, artifact, working_dir }
    }

    /// Arguments following the Java executable
    pub fn java_arguments(&self) -> String {
        format!(
            "-server -XX:+UseG1GC -XX:+UnlockExperimentalVMOptions -Xmx{}M -Xms{}M -jar {} nogui",
            self.recommended_ram, self.minimum_ram, self.artifact
        )
    }

    pub fn posix_script(&self) -> String {
        let mut script = String::from("#!/bin/bash\n");
        if let Some(dir) = &self.working_dir {
            script.push_str(&format!("cd \"{}\" || exit 1\n", dir.display()));
        }
        script.push_str(&format!("echo \"{}\"\n", EULA_PROMPT));
        script.push_str("read -n 1 -p \"[y/n] \" EULA\necho\n");
        script.push_str("if [ \"$EULA\" = \"y\" ]; then\n    echo \"eula=true\" > eula.txt\nfi\n");
        script.push_str(&format!("java {}\n", self.java_arguments()));
        script
    }

    pub fn windows_script(&self) -> String {
        let mut script = String::from("@echo off\r\n");
        if let Some(dir) = &self.working_dir {
            script.push_str(&format!("cd /d \"{}\"\r\n", dir.display()));
        }
        script.push_str(&format!("echo \"{}\"\r\n", EULA_PROMPT));
        script.push_str("set /p EULA=[y/n]\r\n");
        script.push_str("IF /I \"%EULA%\" NEQ \"y\" GOTO END\r\n");
        script.push_str("echo eula=true>eula.txt\r\n:END\r\n");
        script.push_str(&format!("java.exe {}\r\n", self.java_arguments()));
        script
    }
}

/// Write both scripts into `dir`, skipping any that already exist.
/// Returns the scripts that were created; write failures are only logged.
pub async fn write_start_scripts(dir: &Path, command: &StartCommand) -> Vec<PathBuf> {
    let scripts = [
        (dir.join(POSIX_SCRIPT), command.posix_script()),
        (dir.join(WINDOWS_SCRIPT), command.windows_script()),
    ];

    let mut written = Vec::new();
    for (path, contents) in scripts {
        match create_new(&path, &contents).await {
            Ok(true) => {
                info!("Wrote {}", path.display());
                written.push(path);
            }
            Ok(false) => debug!("{} already exists, leaving it untouched", path.display()),
            Err(e) => error!("Unable to write {}: {}", path.display(), e),
        }
    }
    written
}

/// Create `path` with `contents` unless it already exists
async fn create_new(path: &Path, contents: &str) -> std::io::Result<bool> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o755);

    let mut file = match options.open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    Ok(true)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
