use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod aws;
pub mod processor;

use crate::config::TranscriptionConfig;
use crate::Result;

pub use aws::AwsTranscriber;

/// A recognized word with its position in the audio, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl WordTiming {
    /// Build a timing, clamping so that `0 <= start_time <= end_time`
    pub fn new(word: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        let start_time = start_time.max(0.0);
        Self {
            word: word.into(),
            start_time,
            end_time: end_time.max(start_time),
        }
    }
}

/// One ranked hypothesis for a segment of speech
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: Option<f64>,
    pub words: Vec<WordTiming>,
}

/// A stretch of recognized speech; alternatives are ordered best first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionSegment {
    pub alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Uncompressed 16-bit little-endian PCM
    Linear16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProfile {
    /// Tuned for long recordings rather than short commands
    LongForm,
}

/// How a long-running recognition job should interpret the uploaded audio
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub primary_language: String,
    pub alternative_languages: Vec<String>,
    pub word_time_offsets: bool,
    pub automatic_punctuation: bool,
    pub model: ModelProfile,
}

impl RecognitionConfig {
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self {
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: config.sample_rate,
            primary_language: config.primary_language.clone(),
            alternative_languages: config.alternative_languages.clone(),
            word_time_offsets: true,
            automatic_punctuation: true,
            model: ModelProfile::LongForm,
        }
    }
}

/// Managed speech-to-text service running long jobs against uploaded audio
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Start a job for the audio at `locator`, returning its id
    async fn submit(&self, locator: &str, config: &RecognitionConfig) -> Result<String>;

    /// Block until the job finishes or `timeout` elapses
    async fn await_result(&self, job_id: &str, timeout: Duration) -> Result<Vec<RecognitionSegment>>;
}

/// Join each segment's top transcript and flatten its word timings, in order
pub fn assemble(segments: &[RecognitionSegment]) -> (String, Vec<WordTiming>) {
    let top: Vec<&RecognitionAlternative> = segments
        .iter()
        .filter_map(|segment| segment.alternatives.first())
        .collect();

    let text = top
        .iter()
        .map(|alt| alt.transcript.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let words = top
        .iter()
        .flat_map(|alt| alt.words.iter().cloned())
        .collect();

    (text, words)
}
