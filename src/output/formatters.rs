use anyhow::Result;

use crate::pipeline::TranscriptionResult;
use crate::transcribe::WordTiming;

/// Words per SRT cue when building subtitles from word timings
const WORDS_PER_CUE: usize = 5;

/// Span of one block in the timestamped view, in seconds
const BLOCK_SECONDS: f64 = 10.0;

/// Format as plain text
pub fn format_as_text(result: &TranscriptionResult) -> String {
    result.transcription.clone()
}

/// Format as JSON
pub fn format_as_json(result: &TranscriptionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Format as SRT, grouping word timings into cues of five words.
///
/// Subtitle-sourced results carry no timings; their lines become untimed cues.
pub fn format_as_srt(result: &TranscriptionResult) -> String {
    if result.timestamps.is_empty() {
        return result
            .transcription
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                format!(
                    "{}\n{} --> {}\n{}\n\n",
                    i + 1,
                    srt_timestamp(0.0),
                    srt_timestamp(0.0),
                    line.trim()
                )
            })
            .collect();
    }

    result
        .timestamps
        .chunks(WORDS_PER_CUE)
        .enumerate()
        .map(|(i, group)| {
            let start = group.first().map(|w| w.start_time).unwrap_or_default();
            let end = group.last().map(|w| w.end_time).unwrap_or_default();
            let text = group
                .iter()
                .map(|w| w.word.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}\n{} --> {}\n{}\n\n", i + 1, srt_timestamp(start), srt_timestamp(end), text)
        })
        .collect()
}

/// Format as ten-second blocks headed `[m:ss - m:ss]`, separated by blank lines.
///
/// A block ends at the start time of its last word.
pub fn format_as_blocks(result: &TranscriptionResult) -> String {
    if result.timestamps.is_empty() {
        return result.transcription.clone();
    }

    let mut blocks = Vec::new();
    let mut current: Vec<&WordTiming> = Vec::new();

    for word in &result.timestamps {
        if let Some(first) = current.first() {
            if word.start_time - first.start_time > BLOCK_SECONDS {
                blocks.push(render_block(&current));
                current.clear();
            }
        }
        current.push(word);
    }

    if !current.is_empty() {
        blocks.push(render_block(&current));
    }

    blocks.join("\n\n")
}

fn render_block(words: &[&WordTiming]) -> String {
    let start = words.first().map(|w| w.start_time).unwrap_or_default();
    let end = words.last().map(|w| w.start_time).unwrap_or_default();
    let text = words
        .iter()
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{} - {}]\n{}", minutes_seconds(start), minutes_seconds(end), text)
}

/// `HH:MM:SS,mmm`
pub fn srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// `m:ss`
fn minutes_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
