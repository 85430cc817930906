use std::path::PathBuf;
use std::sync::Arc;

pub mod cleaner;

pub use cleaner::clean_srt_to_text;

use crate::extractors::MediaSource;
use crate::utils::ScopedArtifacts;
use crate::Result;

/// Fetches an existing caption track and turns it into plain text
pub struct SubtitlePipeline {
    source: Arc<dyn MediaSource>,
    work_dir: PathBuf,
}

impl SubtitlePipeline {
    pub fn new(source: Arc<dyn MediaSource>, work_dir: PathBuf) -> Self {
        Self { source, work_dir }
    }

    /// Cleaned caption text, or `None` when the video has no usable captions
    pub async fn fetch_subtitle_text(&self, url: &str, lang: &str) -> Result<Option<String>> {
        let Some(srt_path) = self.source.fetch_subtitles(url, lang, &self.work_dir).await? else {
            tracing::info!("No {} subtitles available for {}", lang, url);
            return Ok(None);
        };

        let mut artifacts = ScopedArtifacts::new();
        artifacts.track(&srt_path);

        let raw = fs_err::read(&srt_path)?;
        artifacts.release();

        let text = clean_srt_to_text(&String::from_utf8_lossy(&raw));
        if text.is_empty() {
            tracing::info!("Subtitles for {} were empty after cleaning", url);
            return Ok(None);
        }

        Ok(Some(text))
    }
}
