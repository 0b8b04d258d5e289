use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::transcribe::Transcript;

pub mod formatters;

pub use formatters::*;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Render a transcript in the requested format
pub fn render(transcript: &Transcript, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_as_text(transcript),
        OutputFormat::Json => format_as_json(transcript)?,
        OutputFormat::Srt => format_as_srt(transcript),
    })
}

/// `YYYYMMDD_HHMMSS.<ext>` for the given moment
pub fn transcript_filename(now: DateTime<Local>, format: OutputFormat) -> String {
    format!("{}.{}", now.format(TIMESTAMP_FORMAT), format.extension())
}

/// Whether `name` looks like a file written by [`save_transcript`]
pub fn is_transcript_filename(name: &str, format: OutputFormat) -> bool {
    name.strip_suffix(format.extension())
        .and_then(|stem| stem.strip_suffix('.'))
        .is_some_and(|stamp| {
            chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok()
        })
}

/// Save transcription result to a timestamped file inside `dir`
pub fn save_transcript(
    transcript: &Transcript,
    dir: &Path,
    format: OutputFormat,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let content = render(transcript, format)?;

    fs_err::create_dir_all(dir).context("Failed to create transcription directory")?;

    let path = dir.join(transcript_filename(now, format));
    if path.exists() {
        tracing::warn!("Overwriting existing transcript {}", path.display());
    }

    fs_err::write(&path, content)?;
    Ok(path)
}
