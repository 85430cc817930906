use anyhow::{Context, Result};
use aws_sdk_transcribe::types::{TranscriptionJob, TranscriptionJobStatus};
use aws_sdk_transcribe::Client as TranscribeClient;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

use super::{RecognitionAlternative, RecognitionSegment, WordTiming};
use crate::TranscriberError;

/// AWS Transcribe transcript format
#[derive(Debug, Deserialize)]
struct AwsTranscript {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    #[serde(default)]
    transcripts: Vec<TranscriptText>,
    #[serde(default)]
    items: Vec<TranscriptItem>,
    /// Present when the job ran with alternatives enabled
    #[serde(default)]
    segments: Option<Vec<AwsSegment>>,
}

#[derive(Debug, Deserialize)]
struct TranscriptText {
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptItem {
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(rename = "type")]
    item_type: String,
    alternatives: Vec<ItemAlternative>,
}

#[derive(Debug, Deserialize)]
struct ItemAlternative {
    confidence: Option<String>,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AwsSegment {
    #[serde(default)]
    alternatives: Vec<SegmentAlternative>,
}

#[derive(Debug, Deserialize)]
struct SegmentAlternative {
    transcript: String,
    #[serde(default)]
    items: Vec<SegmentItem>,
}

#[derive(Debug, Deserialize)]
struct SegmentItem {
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
    content: String,
    confidence: Option<String>,
}

/// Polls one transcription job and converts its transcript into segments
pub struct TranscriptionProcessor {
    client: TranscribeClient,
    job_id: String,
}

impl TranscriptionProcessor {
    pub fn new(client: TranscribeClient, job_id: String) -> Self {
        Self { client, job_id }
    }

    /// Wait for transcription job completion, polling with backoff up to 30 seconds
    pub async fn wait_for_completion(&self) -> Result<Vec<RecognitionSegment>> {
        let start_time = std::time::Instant::now();
        let mut check_count: u64 = 0;

        let job = loop {
            check_count += 1;

            let job = self.get_transcription_job().await?;

            match job.transcription_job_status() {
                Some(TranscriptionJobStatus::InProgress) | Some(TranscriptionJobStatus::Queued) => {
                    tracing::debug!(
                        "Job {} still running ({}s elapsed, check #{})",
                        self.job_id,
                        start_time.elapsed().as_secs(),
                        check_count
                    );

                    let wait_time = std::cmp::min(5 + (check_count - 1) * 2, 30);
                    sleep(Duration::from_secs(wait_time)).await;
                }
                Some(TranscriptionJobStatus::Completed) => break job,
                Some(TranscriptionJobStatus::Failed) => {
                    let failure_reason = job.failure_reason().unwrap_or("Unknown error");
                    return Err(TranscriberError::Transcription(format!(
                        "job {} failed: {}",
                        self.job_id, failure_reason
                    ))
                    .into());
                }
                other => {
                    return Err(TranscriberError::Transcription(format!(
                        "job {} reported unexpected status {:?}",
                        self.job_id, other
                    ))
                    .into());
                }
            }
        };

        tracing::info!(
            "Job {} completed in {}s",
            self.job_id,
            start_time.elapsed().as_secs()
        );

        let transcript_uri = job
            .transcript()
            .and_then(|t| t.transcript_file_uri())
            .ok_or_else(|| anyhow::anyhow!("No transcript URI found"))?;

        let transcript_json = download_transcript(transcript_uri).await?;
        parse_transcript(&transcript_json)
    }

    /// Get transcription job details
    async fn get_transcription_job(&self) -> Result<TranscriptionJob> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(&self.job_id)
            .send()
            .await
            .context("Failed to get transcription job status")?;

        response
            .transcription_job()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Transcription job not found"))
    }
}

/// Download the transcript document the job wrote
async fn download_transcript(uri: &str) -> Result<String> {
    let response = reqwest::get(uri)
        .await
        .context("Failed to download transcript")?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to download transcript: HTTP {}", response.status());
    }

    response
        .text()
        .await
        .context("Failed to read transcript content")
}

/// Convert a transcript document into segments with ranked alternatives.
///
/// Without alternative segments the whole transcript becomes one segment whose
/// words come from the pronunciation items.
pub fn parse_transcript(json: &str) -> Result<Vec<RecognitionSegment>> {
    let transcript: AwsTranscript =
        serde_json::from_str(json).context("Failed to parse transcript JSON")?;
    let results = transcript.results;

    if let Some(segments) = results.segments.filter(|s| !s.is_empty()) {
        return Ok(segments.into_iter().map(convert_segment).collect());
    }

    let text = results
        .transcripts
        .iter()
        .map(|t| t.transcript.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let pronunciations: Vec<(&TranscriptItem, &ItemAlternative)> = results
        .items
        .iter()
        .filter(|item| item.item_type == "pronunciation")
        .filter_map(|item| Some((item, item.alternatives.first()?)))
        .collect();

    let confidences: Vec<f64> = pronunciations
        .iter()
        .filter_map(|(_, alt)| alt.confidence.as_deref()?.parse().ok())
        .collect();

    let words = pronunciations
        .iter()
        .filter_map(|(item, alt)| {
            word_timing(&alt.content, item.start_time.as_deref(), item.end_time.as_deref())
        })
        .collect();

    Ok(vec![RecognitionSegment {
        alternatives: vec![RecognitionAlternative {
            transcript: text,
            confidence: average(&confidences),
            words,
        }],
    }])
}

fn convert_segment(segment: AwsSegment) -> RecognitionSegment {
    let alternatives = segment
        .alternatives
        .into_iter()
        .map(|alt| {
            let confidences: Vec<f64> = alt
                .items
                .iter()
                .filter_map(|item| item.confidence.as_deref()?.parse().ok())
                .collect();

            let words = alt
                .items
                .iter()
                .filter(|item| item.item_type.as_deref().unwrap_or("pronunciation") == "pronunciation")
                .filter_map(|item| {
                    word_timing(&item.content, item.start_time.as_deref(), item.end_time.as_deref())
                })
                .collect();

            RecognitionAlternative {
                transcript: alt.transcript,
                confidence: average(&confidences),
                words,
            }
        })
        .collect();

    RecognitionSegment { alternatives }
}

fn word_timing(word: &str, start: Option<&str>, end: Option<&str>) -> Option<WordTiming> {
    let start = start?.parse::<f64>().ok()?;
    let end = end?.parse::<f64>().ok()?;
    Some(WordTiming::new(word, start, end))
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
