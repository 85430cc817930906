//! Video Transcriber - turns a YouTube video into text
//!
//! Existing caption tracks are reused when the video has them. Otherwise the audio is
//! downloaded, trimmed, uploaded to S3 and transcribed with AWS Transcribe. The crate
//! exposes the pipelines, the orchestrator that chooses between them, and the HTTP
//! surface that serves the result as JSON.

pub mod audio;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod subtitles;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::MediaSource;
pub use pipeline::{Orchestrator, PipelineOutcome, TranscriptionRequest, TranscriptionResult};
pub use storage::ObjectStore;
pub use transcribe::{SpeechRecognizer, WordTiming};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the transcriber
#[derive(thiserror::Error, Debug)]
pub enum TranscriberError {
    #[error("Media extraction failed: {0}")]
    MediaExtraction(String),

    #[error("Audio processing failed: {0}")]
    AudioProcessing(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Transcription timed out after {0} seconds")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}
