//! transcribe-media - download audio from a URL and transcribe it locally
//!
//! This library wires a media fetcher (`yt-dlp`) to a Whisper speech model: the
//! downloaded audio is decoded, reduced to mono, cut into fixed-length chunks and
//! transcribed chunk by chunk into a timestamped text file.

pub mod audio;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod transcribe;
pub mod utils;

pub use audio::{Chunk, Waveform};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{DownloadError, DownloadedMedia, MediaFetcher, MediaMode};
pub use transcribe::{Transcript, TranscriptionError, TranscriptionPipeline};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

const DASH_HINT: &str = "For fully fragmented DASH manifests, merging requires FFmpeg.";

/// Error types specific to a transcription run
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("Invalid mode {0:?}, must be 1 or 2")]
    InvalidMode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error("Failed to write transcription to {dir}")]
    Output {
        dir: String,
        #[source]
        source: anyhow::Error,
    },
}

impl TranscriptorError {
    /// Extra advice printed under the error message, if this kind of failure has any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            TranscriptorError::Download(err) if err.involves_dash() => Some(DASH_HINT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_download_failure_has_hint() {
        let err = TranscriptorError::from(DownloadError::NoMedia {
            url: "https://example.com/manifest.mpd".to_string(),
            mode: MediaMode::Dash,
        });
        assert_eq!(err.hint(), Some(DASH_HINT));
        assert!(err.to_string().contains("DASH"));
    }

    #[test]
    fn test_other_failures_have_no_hint() {
        let direct = TranscriptorError::from(DownloadError::NoMedia {
            url: "https://example.com/a.mp3".to_string(),
            mode: MediaMode::Direct,
        });
        assert_eq!(direct.hint(), None);

        let mode = TranscriptorError::InvalidMode("3".to_string());
        assert_eq!(mode.hint(), None);
        assert_eq!(mode.to_string(), "Invalid mode \"3\", must be 1 or 2");
    }
}
