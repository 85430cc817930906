use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::trim_leading;
use crate::extractors::MediaSource;
use crate::storage::{object_key, release_object, ObjectStore};
use crate::transcribe::{assemble, RecognitionConfig, SpeechRecognizer, WordTiming};
use crate::utils::ScopedArtifacts;
use crate::Result;

/// Knobs for the audio fallback path
#[derive(Debug, Clone)]
pub struct AudioSettings {
    pub work_dir: PathBuf,
    pub trim_offset_secs: f64,
    pub key_prefix: Option<String>,
    pub recognition: RecognitionConfig,
    pub max_wait: Duration,
}

/// Download, trim, upload, transcribe; local and remote copies never outlive the call
pub struct AudioPipeline {
    source: Arc<dyn MediaSource>,
    store: Arc<dyn ObjectStore>,
    recognizer: Arc<dyn SpeechRecognizer>,
    settings: AudioSettings,
}

impl AudioPipeline {
    pub fn new(
        source: Arc<dyn MediaSource>,
        store: Arc<dyn ObjectStore>,
        recognizer: Arc<dyn SpeechRecognizer>,
        settings: AudioSettings,
    ) -> Self {
        Self {
            source,
            store,
            recognizer,
            settings,
        }
    }

    pub async fn run(&self, url: &str) -> Result<(String, Vec<WordTiming>)> {
        let mut local = ScopedArtifacts::new();

        let original = self.source.download_audio(url, &self.settings.work_dir).await?;
        local.track(&original);

        let trimmed = trim_leading(&original, self.settings.trim_offset_secs).await?;
        local.track(&trimmed);

        let key = object_key(self.settings.key_prefix.as_deref(), &trimmed);
        let locator = self.store.put(&key, &trimmed).await?;
        local.release();

        let result = self.transcribe_uploaded(&locator).await;
        release_object(self.store.as_ref(), &key).await;
        result
    }

    async fn transcribe_uploaded(&self, locator: &str) -> Result<(String, Vec<WordTiming>)> {
        let job_id = self
            .recognizer
            .submit(locator, &self.settings.recognition)
            .await?;

        tracing::info!("Waiting for transcription job {}", job_id);
        let segments = self
            .recognizer
            .await_result(&job_id, self.settings.max_wait)
            .await?;

        Ok(assemble(&segments))
    }
}
