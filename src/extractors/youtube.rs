use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{artifact_base, take_artifact, MediaSource};
use crate::utils::remove_best_effort;
use crate::{Result, TranscriberError};

/// User agent matching the Android player client, which YouTube blocks less often
const ANDROID_USER_AGENT: &str = "com.google.android.youtube/19.26.33 (Linux; U; Android 13)";

/// Caption and audio source backed by yt-dlp
pub struct YtDlpSource {
    yt_dlp_path: String,
}

impl YtDlpSource {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    pub fn with_binary(path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: path.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                TranscriberError::MediaExtraction(format!("could not run {}: {}", self.yt_dlp_path, e))
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriberError::MediaExtraction(format!("yt-dlp failed: {}", error.trim())).into());
        }

        Ok(())
    }
}

/// A single language code such as `es` or `pt-BR`; selectors like `all`, `es.*` or `en,es` are refused
fn is_language_code(lang: &str) -> bool {
    let mut chars = lang.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        && lang.len() <= 35
        && !lang.eq_ignore_ascii_case("all")
}

/// Arguments for writing human and auto-generated captions as SRT, without the media
fn subtitle_args(url: &str, lang: &str, output_template: &Path) -> Vec<String> {
    let mut args: Vec<String> = [
        "--skip-download",
        "--write-subs",
        "--write-auto-subs",
        "--sub-langs",
        lang,
        "--sub-format",
        "srt/best",
        "--convert-subs",
        "srt",
        "--no-playlist",
        "--quiet",
        "--no-warnings",
        "--output",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    args.push(output_template.to_string_lossy().into_owned());
    args.push(url.to_string());
    args
}

/// Arguments for best-audio download converted to mono 16 kHz WAV
fn audio_args(url: &str, output_template: &Path) -> Vec<String> {
    let mut args: Vec<String> = [
        "--format",
        "bestaudio/best",
        "--extract-audio",
        "--audio-format",
        "wav",
        "--postprocessor-args",
        "ExtractAudio:-ac 1 -ar 16000",
        "--no-playlist",
        // Network resilience
        "--retries",
        "8",
        "--fragment-retries",
        "8",
        "--concurrent-fragments",
        "1",
        "--force-ipv4",
        "--no-check-certificates",
        "--geo-bypass-country",
        "US",
        "--extractor-args",
        "youtube:player_client=android",
        "--user-agent",
        ANDROID_USER_AGENT,
        "--add-header",
        "Accept:*/*",
        "--add-header",
        "Accept-Language:en-US,en;q=0.9",
        "--quiet",
        "--no-warnings",
        "--output",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    args.push(output_template.to_string_lossy().into_owned());
    args.push(url.to_string());
    args
}

#[async_trait]
impl MediaSource for YtDlpSource {
    async fn fetch_subtitles(&self, url: &str, lang: &str, work_dir: &Path) -> Result<Option<PathBuf>> {
        if !is_language_code(lang) {
            return Err(TranscriberError::MediaExtraction(format!("invalid subtitle language: {:?}", lang)).into());
        }

        let base = artifact_base("subs");
        let template = work_dir.join(format!("{}.%(ext)s", base));

        tracing::debug!("Fetching {} subtitles for: {}", lang, url);
        let fetched = self.run(&subtitle_args(url, lang, &template)).await;
        // yt-dlp names caption files `<base>.<lang>.srt`
        let track = take_artifact(work_dir, &base, "srt")?;
        discard_on_failure(fetched, track)
    }

    async fn download_audio(&self, url: &str, work_dir: &Path) -> Result<PathBuf> {
        let base = artifact_base("audio");
        let template = work_dir.join(format!("{}.%(ext)s", base));

        tracing::debug!("Downloading audio for: {}", url);
        let fetched = self.run(&audio_args(url, &template)).await;
        let audio = take_artifact(work_dir, &base, "wav")?;

        discard_on_failure(fetched, audio)?.ok_or_else(|| {
            TranscriberError::MediaExtraction(format!("yt-dlp produced no audio file for {}", url)).into()
        })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Drop a partially written artifact when the yt-dlp run itself failed
fn discard_on_failure(run: Result<()>, artifact: Option<PathBuf>) -> Result<Option<PathBuf>> {
    match run {
        Ok(()) => Ok(artifact),
        Err(e) => {
            if let Some(path) = &artifact {
                remove_best_effort(path);
            }
            Err(e)
        }
    }
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new()
    }
}
