use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod youtube;

use crate::utils::remove_best_effort;
use crate::Result;

pub use youtube::YtDlpSource;

/// Trait for obtaining captions and audio for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Write the caption track for `lang` as an SRT file inside `work_dir`.
    ///
    /// Returns `None` when the video has no captions in that language.
    async fn fetch_subtitles(&self, url: &str, lang: &str, work_dir: &Path) -> Result<Option<PathBuf>>;

    /// Download the best available audio as a mono 16 kHz WAV file inside `work_dir`
    async fn download_audio(&self, url: &str, work_dir: &Path) -> Result<PathBuf>;

    /// Get the name of this source
    fn name(&self) -> &'static str;
}

/// Unique base name for a per-request artifact, e.g. `audio_3f2a...`
pub fn artifact_base(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Keep the first `base`-prefixed file with extension `ext` and remove every other
/// file the run left under `base`
pub fn take_artifact(dir: &Path, base: &str, ext: &str) -> Result<Option<PathBuf>> {
    let mut kept = None;

    for path in artifacts_with_base(dir, base)? {
        if kept.is_none() && has_extension(&path, ext) {
            kept = Some(path);
        } else {
            remove_best_effort(&path);
        }
    }

    Ok(kept)
}

fn artifacts_with_base(dir: &Path, base: &str) -> Result<Vec<PathBuf>> {
    let mut matches = Vec::new();

    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        let name_matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(base));

        if name_matches && path.is_file() {
            matches.push(path);
        }
    }

    matches.sort();
    Ok(matches)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
