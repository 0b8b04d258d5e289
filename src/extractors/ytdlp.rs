use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

use super::{DownloadError, DownloadedMedia, MediaFetcher, MediaMode};
use crate::config::DownloadConfig;

/// Media fetcher backed by the yt-dlp command line tool
pub struct YtDlpFetcher {
    yt_dlp_path: String,
    ffmpeg_location: Option<PathBuf>,
    audio_format: String,
    temp_root: PathBuf,
}

impl YtDlpFetcher {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            ffmpeg_location: config.ffmpeg_location.clone(),
            audio_format: config.audio_format.clone(),
            temp_root: config.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<(), DownloadError> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DownloadError::ToolUnavailable {
                tool: self.yt_dlp_path.clone(),
                reason: format!("{} (install it from https://github.com/yt-dlp/yt-dlp)", e),
            })?;

        if !output.status.success() {
            return Err(DownloadError::ToolUnavailable {
                tool: self.yt_dlp_path.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    /// Create the per-run directory the download lands in
    fn create_work_dir(&self) -> Result<PathBuf, DownloadError> {
        let dir = self
            .temp_root
            .join(format!("transcribe-media-{}", &Uuid::new_v4().simple().to_string()[..8]));
        fs_err::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Build the yt-dlp argument list for one download
    pub fn build_args(&self, url: &str, mode: MediaMode, work_dir: &Path) -> Vec<String> {
        let template = work_dir.join("audio.%(ext)s");

        let mut args: Vec<String> = vec![
            "--format".into(),
            "bestaudio/best".into(),
            "--output".into(),
            template.to_string_lossy().into_owned(),
            "--no-playlist".into(),
            "--ignore-errors".into(),
            "--no-warnings".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            self.audio_format.clone(),
            // final path once post-processing has renamed the file
            "--print".into(),
            "after_move:filepath".into(),
        ];

        if mode == MediaMode::Dash {
            args.push("--merge-output-format".into());
            args.push(self.audio_format.clone());
        }

        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.to_string_lossy().into_owned());
        }

        args.push(url.to_string());
        args
    }
}

/// Pick the downloaded file out of yt-dlp's `--print` output.
fn parse_printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "NA")
        .last()
        .map(PathBuf::from)
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, mode: MediaMode) -> Result<DownloadedMedia, DownloadError> {
        self.check_availability().await?;

        let work_dir = self.create_work_dir()?;
        let args = self.build_args(url, mode, &work_dir);

        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        let output = Command::new(&self.yt_dlp_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        let path = match parse_printed_path(&stdout) {
            Some(path) if path.is_file() => path,
            _ if !output.status.success() && !stderr.is_empty() => {
                return Err(DownloadError::Failed {
                    url: url.to_string(),
                    mode,
                    stderr,
                });
            }
            _ => {
                return Err(DownloadError::NoMedia {
                    url: url.to_string(),
                    mode,
                });
            }
        };

        if !output.status.success() {
            tracing::warn!("yt-dlp reported errors but produced {}: {}", path.display(), stderr);
        }

        Ok(DownloadedMedia {
            path,
            work_dir,
            mode,
        })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
