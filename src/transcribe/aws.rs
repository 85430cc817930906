use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat, Settings};
use aws_sdk_transcribe::Client as TranscribeClient;
use std::time::Duration;
use uuid::Uuid;

use super::processor::TranscriptionProcessor;
use super::{AudioEncoding, RecognitionConfig, RecognitionSegment, SpeechRecognizer};
use crate::{Result, TranscriberError};

/// [`SpeechRecognizer`] backed by AWS Transcribe batch jobs.
///
/// Batch jobs already target long recordings and punctuate automatically, so the
/// model profile and punctuation flags need no extra request fields.
pub struct AwsTranscriber {
    client: TranscribeClient,
}

impl AwsTranscriber {
    pub fn new(sdk_config: &aws_types::SdkConfig) -> Self {
        Self {
            client: TranscribeClient::new(sdk_config),
        }
    }
}

/// Languages offered to automatic identification: the primary one first, no repeats
fn language_options(config: &RecognitionConfig) -> Vec<String> {
    let mut options = vec![config.primary_language.clone()];
    for lang in &config.alternative_languages {
        if !options.contains(lang) {
            options.push(lang.clone());
        }
    }
    options
}

#[async_trait]
impl SpeechRecognizer for AwsTranscriber {
    async fn submit(&self, locator: &str, config: &RecognitionConfig) -> Result<String> {
        let job_name = format!("transcriber_{}", Uuid::new_v4());

        tracing::info!("Starting transcription job: {}", job_name);

        let media_format = match config.encoding {
            AudioEncoding::Linear16 => MediaFormat::Wav,
        };

        let media = Media::builder().media_file_uri(locator).build();

        let mut job_builder = self
            .client
            .start_transcription_job()
            .transcription_job_name(&job_name)
            .media_format(media_format)
            .media_sample_rate_hertz(config.sample_rate_hertz as i32)
            .media(media);

        let options = language_options(config);
        if options.len() > 1 {
            tracing::info!("Identifying language among: {}", options.join(", "));
            job_builder = job_builder.identify_language(true);
            for lang in &options {
                job_builder = job_builder.language_options(LanguageCode::from(lang.as_str()));
            }
        } else {
            tracing::info!("Using language: {}", config.primary_language);
            job_builder = job_builder.language_code(LanguageCode::from(config.primary_language.as_str()));
        }

        // Ranked alternatives per segment; AWS requires at least 2
        let settings = Settings::builder()
            .show_alternatives(true)
            .max_alternatives(2)
            .build();
        job_builder = job_builder.settings(settings);

        job_builder
            .send()
            .await
            .context("Failed to start transcription job")?;

        Ok(job_name)
    }

    async fn await_result(&self, job_id: &str, timeout: Duration) -> Result<Vec<RecognitionSegment>> {
        let processor = TranscriptionProcessor::new(self.client.clone(), job_id.to_string());

        match tokio::time::timeout(timeout, processor.wait_for_completion()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Job {} did not finish within {}s", job_id, timeout.as_secs());
                Err(TranscriberError::Timeout(timeout.as_secs()).into())
            }
        }
    }
}
