use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Local files owned by one request, removed when the guard is released or dropped.
///
/// Removal is best-effort: failures are logged and never returned.
#[derive(Debug, Default)]
pub struct ScopedArtifacts {
    paths: Vec<PathBuf>,
}

impl ScopedArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a file so it is removed with the guard
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Remove every tracked file now
    pub fn release(&mut self) {
        for path in self.paths.drain(..) {
            remove_best_effort(&path);
        }
    }
}

impl Drop for ScopedArtifacts {
    fn drop(&mut self) {
        self.release();
    }
}

/// Delete a file, logging (not returning) any failure other than "not found"
pub fn remove_best_effort(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for captions and audio download".to_string());
    }

    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required by yt-dlp for SRT and WAV conversion".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
