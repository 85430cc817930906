use anyhow::Context;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::{Path, PathBuf};

use crate::{Result, TranscriberError};

/// Path of the trimmed copy written next to `original`: `<stem>_trimmed.wav`
pub fn trimmed_path(original: &Path) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    original.with_file_name(format!("{}_trimmed.wav", stem))
}

/// Drop the first `offset_secs` of a WAV file, writing the rest to a new file.
///
/// Clips no longer than the offset are copied whole rather than emptied.
pub async fn trim_leading(original: &Path, offset_secs: f64) -> Result<PathBuf> {
    let original = original.to_path_buf();

    tokio::task::spawn_blocking(move || trim_leading_blocking(&original, offset_secs))
        .await
        .context("Audio trimming task panicked")?
}

fn trim_leading_blocking(original: &Path, offset_secs: f64) -> Result<PathBuf> {
    let output = trimmed_path(original);

    let reader = WavReader::open(original).map_err(|e| {
        TranscriberError::AudioProcessing(format!("cannot read {}: {}", original.display(), e))
    })?;
    let spec = reader.spec();

    let total_frames = reader.duration() as u64;
    let offset_frames = (offset_secs.max(0.0) * spec.sample_rate as f64).round() as u64;
    let skip_frames = if total_frames <= offset_frames {
        tracing::warn!(
            "Audio is {:.1}s long, shorter than the {:.1}s trim offset; keeping it whole",
            total_frames as f64 / spec.sample_rate as f64,
            offset_secs
        );
        0
    } else {
        offset_frames
    };
    let skip_samples = (skip_frames * spec.channels as u64) as usize;

    let mut writer = WavWriter::create(&output, spec).map_err(|e| {
        TranscriberError::AudioProcessing(format!("cannot write {}: {}", output.display(), e))
    })?;

    let copied = match spec.sample_format {
        SampleFormat::Float => copy_samples::<f32, _>(reader, &mut writer, skip_samples),
        SampleFormat::Int => copy_samples::<i32, _>(reader, &mut writer, skip_samples),
    };

    if let Err(e) = copied.and_then(|_| writer.finalize()) {
        crate::utils::remove_best_effort(&output);
        return Err(TranscriberError::AudioProcessing(format!(
            "trimming {} failed: {}",
            original.display(),
            e
        ))
        .into());
    }

    tracing::debug!(
        "Trimmed {:.1}s from {} into {}",
        skip_frames as f64 / spec.sample_rate as f64,
        original.display(),
        output.display()
    );

    Ok(output)
}

fn copy_samples<S, R>(
    mut reader: WavReader<R>,
    writer: &mut WavWriter<std::io::BufWriter<std::fs::File>>,
    skip_samples: usize,
) -> hound::Result<()>
where
    S: hound::Sample,
    R: std::io::Read,
{
    for sample in reader.samples::<S>().skip(skip_samples) {
        writer.write_sample(sample?)?;
    }
    Ok(())
}
