use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub mod audio;

pub use audio::{AudioPipeline, AudioSettings};

use crate::config::Config;
use crate::extractors::{MediaSource, YtDlpSource};
use crate::storage::{ObjectStore, S3Store};
use crate::subtitles::SubtitlePipeline;
use crate::transcribe::{AwsTranscriber, RecognitionConfig, SpeechRecognizer, WordTiming};
use crate::Result;

/// Body of a transcription request
#[derive(Debug, Clone, Default)]
pub struct TranscriptionRequest {
    pub url: Option<String>,
    pub lang: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(url: impl Into<String>, lang: Option<String>) -> Self {
        Self {
            url: Some(url.into()),
            lang,
        }
    }

    /// Lenient parse: a body that is not a JSON object counts as an empty request,
    /// and a field that is not a string counts as absent without discarding the others
    pub fn from_body(body: &[u8]) -> Self {
        let value: serde_json::Value = serde_json::from_slice(body).unwrap_or_default();
        let field = |name: &str| value.get(name).and_then(|v| v.as_str()).map(str::to_string);

        Self {
            url: field("url"),
            lang: field("lang"),
        }
    }

    /// The url to work on, if one was given
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn lang_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.lang
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    Subtitles,
    Audio,
}

/// What the caller gets back, whichever path produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub transcription: String,
    pub timestamps: Vec<WordTiming>,
    pub language: String,
    pub source: TranscriptSource,
}

/// Result of one orchestrated request
#[derive(Debug)]
pub enum PipelineOutcome {
    Subtitles(String),
    Audio { text: String, timings: Vec<WordTiming> },
    Failed(anyhow::Error),
}

impl PipelineOutcome {
    /// Normalize into the response shape; `lang` is the language that was requested
    pub fn into_result(self, lang: &str) -> Result<TranscriptionResult> {
        match self {
            PipelineOutcome::Subtitles(text) => Ok(TranscriptionResult {
                transcription: text,
                timestamps: Vec::new(),
                language: lang.to_string(),
                source: TranscriptSource::Subtitles,
            }),
            PipelineOutcome::Audio { text, timings } => Ok(TranscriptionResult {
                transcription: text,
                timestamps: timings,
                language: "auto".to_string(),
                source: TranscriptSource::Audio,
            }),
            PipelineOutcome::Failed(error) => Err(error),
        }
    }
}

/// Tries captions first and falls back to the audio pipeline, each exactly once
pub struct Orchestrator {
    subtitles: SubtitlePipeline,
    audio: AudioPipeline,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn MediaSource>,
        store: Arc<dyn ObjectStore>,
        recognizer: Arc<dyn SpeechRecognizer>,
        settings: AudioSettings,
    ) -> Self {
        let subtitles = SubtitlePipeline::new(source.clone(), settings.work_dir.clone());
        let audio = AudioPipeline::new(source, store, recognizer, settings);
        Self { subtitles, audio }
    }

    /// Wire yt-dlp, S3 and AWS Transcribe from configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let work_dir = config.work_dir();
        fs_err::create_dir_all(&work_dir)?;

        let sdk_config = config.aws_sdk_config().await?;
        let source = Arc::new(YtDlpSource::new());
        let store = Arc::new(S3Store::new(&sdk_config, config.cloud.bucket.clone()));
        let recognizer = Arc::new(AwsTranscriber::new(&sdk_config));

        tracing::info!(
            "Pipelines ready: source={}, bucket={}, work_dir={}",
            source.name(),
            config.cloud.bucket,
            work_dir.display()
        );

        let settings = AudioSettings {
            work_dir,
            trim_offset_secs: config.app.trim_offset_secs,
            key_prefix: config.cloud.key_prefix.clone(),
            recognition: RecognitionConfig::from_config(&config.cloud.transcription),
            max_wait: Duration::from_secs(config.cloud.transcription.max_wait_secs),
        };

        Ok(Self::new(source, store, recognizer, settings))
    }

    pub async fn run(&self, url: &str, lang: &str) -> PipelineOutcome {
        match self.subtitles.fetch_subtitle_text(url, lang).await {
            Ok(Some(text)) => {
                tracing::info!("Using {} subtitles for {}", lang, url);
                return PipelineOutcome::Subtitles(text);
            }
            Ok(None) => tracing::info!("Falling back to audio transcription for {}", url),
            Err(e) => tracing::warn!("Could not fetch subtitles for {}: {:#}", url, e),
        }

        match self.audio.run(url).await {
            Ok((text, timings)) => PipelineOutcome::Audio { text, timings },
            Err(e) => {
                tracing::error!("Audio transcription failed for {}: {:#}", url, e);
                PipelineOutcome::Failed(e)
            }
        }
    }

    pub async fn transcribe(&self, url: &str, lang: &str) -> Result<TranscriptionResult> {
        self.run(url, lang).await.into_result(lang)
    }
}
