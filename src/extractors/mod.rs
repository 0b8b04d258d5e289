use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

pub mod ytdlp;

pub use ytdlp::YtDlpFetcher;

use crate::TranscriptorError;

/// How the media behind a URL is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaMode {
    /// Direct audio file, YouTube video or RSS/podcast page (menu entry 1)
    Direct,
    /// DASH manifest with separately streamed segments (menu entry 2)
    Dash,
}

impl MediaMode {
    pub fn menu_number(&self) -> u8 {
        match self {
            MediaMode::Direct => 1,
            MediaMode::Dash => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MediaMode::Direct => "Direct audio / YouTube / RSS page",
            MediaMode::Dash => "DASH manifest URL",
        }
    }
}

impl TryFrom<u8> for MediaMode {
    type Error = TranscriptorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MediaMode::Direct),
            2 => Ok(MediaMode::Dash),
            other => Err(TranscriptorError::InvalidMode(other.to_string())),
        }
    }
}

impl FromStr for MediaMode {
    type Err = TranscriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .map_err(|_| TranscriptorError::InvalidMode(trimmed.to_string()))
            .and_then(MediaMode::try_from)
    }
}

impl fmt::Display for MediaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.menu_number(), self.description())
    }
}

/// Audio fetched to local disk for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadedMedia {
    /// Path of the downloaded audio file
    pub path: PathBuf,

    /// Per-run directory holding the download
    pub work_dir: PathBuf,

    /// Mode the media was fetched with
    pub mode: MediaMode,
}

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("{tool} is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Could not download {} from {url}", media_label(.mode))]
    NoMedia { url: String, mode: MediaMode },

    #[error("Downloading {} from {url} failed: {stderr}", media_label(.mode))]
    Failed {
        url: String,
        mode: MediaMode,
        stderr: String,
    },

    #[error("Download I/O error")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Whether this failure happened while fetching a DASH manifest
    pub fn involves_dash(&self) -> bool {
        matches!(
            self,
            DownloadError::NoMedia { mode: MediaMode::Dash, .. }
                | DownloadError::Failed { mode: MediaMode::Dash, .. }
        )
    }
}

fn media_label(mode: &MediaMode) -> &'static str {
    match mode {
        MediaMode::Direct => "media",
        MediaMode::Dash => "DASH media",
    }
}

/// Something that can turn a URL into a local audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download best-available audio for `url` into a fresh work directory
    async fn fetch(&self, url: &str, mode: MediaMode) -> Result<DownloadedMedia, DownloadError>;

    /// Name of the backing tool, for logs
    fn name(&self) -> &'static str;
}

/// Validate and normalize a media URL. Only HTTP(S) is accepted.
pub fn validate_url(url: &str) -> Result<Url, TranscriptorError> {
    let parsed = Url::parse(url.trim()).map_err(|_| TranscriptorError::InvalidUrl(url.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(TranscriptorError::InvalidUrl(format!(
            "{} (URL must use HTTP or HTTPS protocol)",
            url
        )));
    }

    Ok(parsed)
}
