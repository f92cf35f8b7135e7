//! # Tool Path Resolver
//!
//! This module finds and validates the ffmpeg/ffprobe executables before the
//! pipeline runs:
//! - Explicit paths (CLI flags or config file)
//! - `FFMPEG_PATH` / `FFPROBE_PATH` environment overrides
//! - Bundled tools directory (`TOOLS_DIR`, or `assets/ffmpeg/bin`)
//! - System-installed tools on `PATH`
//!
//! `ensure_ready` is idempotent: it never downloads or installs anything, it
//! only checks what is there and hands back a [`Toolchain`].

use crate::config::Config;
use crate::error::ResizeError;
use sha2::{Digest, Sha256};
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Validated executable paths for the external image tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Tool path resolver for bundled and system installs
pub struct ToolPathResolver {
    /// Base directory where tools are bundled
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a new path resolver
    pub fn new() -> Self {
        Self {
            tools_dir: Self::detect_bundled_tools_dir(),
        }
    }

    /// Create a resolver that looks for bundled tools in `tools_dir` only
    pub fn with_tools_dir(tools_dir: Option<PathBuf>) -> Self {
        Self { tools_dir }
    }

    /// Detect the bundled tools directory
    fn detect_bundled_tools_dir() -> Option<PathBuf> {
        // Strategy 1: TOOLS_DIR environment variable (direct override)
        if let Ok(tools_dir) = env::var("TOOLS_DIR") {
            let tools_path = PathBuf::from(tools_dir);
            debug!("Checking TOOLS_DIR environment variable: {:?}", tools_path);
            if tools_path.exists() {
                return Some(tools_path);
            }
        }

        // Strategy 2: assets/ffmpeg/bin under the working directory
        if let Ok(current_dir) = env::current_dir() {
            let tools_path = current_dir.join("assets").join("ffmpeg").join("bin");
            debug!("Checking assets path: {:?}", tools_path);
            if tools_path.exists() {
                return Some(tools_path);
            }
        }

        // Strategy 3: next to the executable
        if let Ok(exe_path) = env::current_exe() {
            if let Some(app_dir) = exe_path.parent() {
                let possible_paths = [
                    app_dir.join("assets").join("ffmpeg").join("bin"),
                    app_dir.join("tools"),
                ];

                for path in &possible_paths {
                    debug!("Checking path next to executable: {:?}", path);
                    if path.exists() {
                        return Some(path.clone());
                    }
                }
            }
        }

        debug!("No bundled tools directory found");
        None
    }

    /// Resolve the path to a specific tool.
    ///
    /// Order: explicit path, `<TOOL>_PATH` env var, bundled dir, system `PATH`.
    pub fn resolve_tool(&self, tool_name: &str, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            debug!("Using explicit path for {}: {:?}", tool_name, path);
            return path.exists().then(|| path.to_path_buf());
        }

        let env_key = format!("{}_PATH", tool_name.to_uppercase());
        if let Some(path) = env::var_os(&env_key).map(PathBuf::from) {
            if path.exists() {
                debug!("Using {} from {}: {:?}", tool_name, env_key, path);
                return Some(path);
            }
            warn!("{} points to a missing file: {:?}", env_key, path);
        }

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled_path = tools_dir.join(executable_name(tool_name));
            if bundled_path.exists() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled_path);
                return Some(bundled_path);
            }
        }

        self.find_in_system_path(tool_name)
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, tool_name: &str) -> Option<PathBuf> {
        let tool_with_ext = executable_name(tool_name);
        let path_var = env::var_os("PATH")?;

        env::split_paths(&path_var)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file())
    }

    /// Get installation instructions for a tool
    fn install_instructions(&self, tool_name: &str) -> String {
        if cfg!(target_os = "linux") {
            "sudo apt-get install ffmpeg".to_string()
        } else if cfg!(target_os = "macos") {
            "brew install ffmpeg".to_string()
        } else {
            format!(
                "download an ffmpeg build and put {} on PATH or in TOOLS_DIR",
                executable_name(tool_name)
            )
        }
    }

    /// Resolve a tool or fail with installation instructions
    pub fn check_tool_with_instructions(
        &self,
        tool_name: &str,
        explicit: Option<&Path>,
    ) -> Result<PathBuf, ResizeError> {
        self.resolve_tool(tool_name, explicit).ok_or_else(|| {
            ResizeError::MissingDependency(format!(
                "'{}' not found. To install, run:\n  {}",
                tool_name,
                self.install_instructions(tool_name)
            ))
        })
    }

    /// Make sure ffmpeg and ffprobe are usable and return their paths.
    ///
    /// Each executable must pass its sha256 sidecar check (when one exists)
    /// and answer `-version` successfully.
    pub async fn ensure_ready(&self, config: &Config) -> Result<Toolchain, ResizeError> {
        let ffmpeg = self.check_tool_with_instructions("ffmpeg", config.ffmpeg_path.as_deref())?;
        let ffprobe =
            self.check_tool_with_instructions("ffprobe", config.ffprobe_path.as_deref())?;

        for (name, path) in [("FFmpeg", &ffmpeg), ("FFprobe", &ffprobe)] {
            verify_sidecar_checksum(path)?;
            let version = query_version(path).await?;
            info!("{} version: {}", name, version);
        }

        Ok(Toolchain { ffmpeg, ffprobe })
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}

/// Run `<exe> -version` and return the first line of its output
async fn query_version(path: &Path) -> Result<String, ResizeError> {
    let output = Command::new(path)
        .arg("-version")
        .output()
        .await
        .map_err(|e| ResizeError::ExternalTool(format!("failed to execute {:?}: {}", path, e)))?;

    if !output.status.success() {
        return Err(ResizeError::ExternalTool(format!(
            "{:?} -version failed: {}",
            path,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}

/// Calculate the SHA-256 of a file as lowercase hex
pub fn calculate_sha256(path: &Path) -> Result<String, ResizeError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Verify `path` against `<path>.sha256` when that file exists.
///
/// The sidecar holds the hex digest, optionally followed by a file name.
pub fn verify_sidecar_checksum(path: &Path) -> Result<(), ResizeError> {
    let mut sidecar = path.as_os_str().to_owned();
    sidecar.push(".sha256");
    let sidecar = PathBuf::from(sidecar);

    if !sidecar.exists() {
        return Ok(());
    }

    let content = std::fs::read_to_string(&sidecar)?;
    let expected = content
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let actual = calculate_sha256(path)?;

    debug!("SHA-256 {:?}: expected {}, actual {}", path, expected, actual);
    if expected != actual {
        return Err(ResizeError::Checksum(format!(
            "{:?}: expected {}, got {}",
            path, expected, actual
        )));
    }

    Ok(())
}
