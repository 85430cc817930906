use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::TranscriptionResult;

pub mod formatters;

pub use formatters::*;

/// Render a result in the requested format
pub fn render(result: &TranscriptionResult, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(result),
        OutputFormat::Json => format_as_json(result)?,
        OutputFormat::Srt => format_as_srt(result),
        OutputFormat::Blocks => format_as_blocks(result),
    };
    Ok(content)
}

/// Save transcription result to file
pub fn save_to_file(result: &TranscriptionResult, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(result, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print transcription result to console
pub fn print_to_console(result: &TranscriptionResult, format: &OutputFormat) -> Result<()> {
    println!("{}", render(result, format)?);
    Ok(())
}
