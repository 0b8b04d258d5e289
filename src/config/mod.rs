use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Speech model settings
    pub model: ModelConfig,

    /// Media download settings
    pub download: DownloadConfig,

    /// Chunking settings
    pub transcription: TranscriptionConfig,

    /// Where and how transcripts are written
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the GGML Whisper weights
    pub path: PathBuf,

    /// Language code passed to the model (auto-detect if not set)
    pub language: Option<String>,

    /// Inference threads (whisper default if not set)
    pub threads: Option<u16>,

    /// Run inference on the GPU when whisper.cpp was built with one
    pub use_gpu: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// yt-dlp executable, looked up on PATH unless absolute
    pub yt_dlp_path: String,

    /// FFmpeg binary or directory handed to yt-dlp for merging
    pub ffmpeg_location: Option<PathBuf>,

    /// Audio container yt-dlp converts downloads to
    pub audio_format: String,

    /// Parent directory for per-run work directories
    pub temp_dir: Option<PathBuf>,

    /// Keep the downloaded audio after a successful run
    pub keep_audio: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Maximum chunk length fed to the model, in seconds
    pub chunk_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving timestamped transcripts
    pub directory: PathBuf,

    /// Default output format
    pub format: OutputFormat,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let models_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("transcribe-media")
            .join("models");

        Self {
            path: models_dir.join("ggml-large-v3.bin"),
            language: None,
            threads: None,
            use_gpu: true,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_location: None,
            audio_format: "m4a".to_string(),
            temp_dir: None,
            keep_audio: false,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self { chunk_seconds: 30 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./transcriptions"),
            format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Read and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("transcribe-media").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.transcription.chunk_seconds == 0 {
            anyhow::bail!("transcription.chunk_seconds must be greater than zero");
        }

        if self.download.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("download.yt_dlp_path must not be empty");
        }

        if self.download.audio_format.trim().is_empty() {
            anyhow::bail!("download.audio_format must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Model: {}", self.model.path.display());
        println!(
            "  Language: {}",
            self.model.language.as_deref().unwrap_or("auto-detect")
        );
        println!("  GPU: {}", self.model.use_gpu);
        println!("  yt-dlp: {}", self.download.yt_dlp_path);
        match &self.download.ffmpeg_location {
            Some(ffmpeg) => println!("  FFmpeg: {}", ffmpeg.display()),
            None => println!("  FFmpeg: (from PATH)"),
        }
        println!("  Keep Audio: {}", self.download.keep_audio);
        println!("  Chunk Length: {}s", self.transcription.chunk_seconds);
        println!("  Output Directory: {}", self.output.directory.display());
        println!("  Default Format: {}", self.output.format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.transcription.chunk_seconds, 30);
        assert_eq!(config.output.directory, PathBuf::from("./transcriptions"));
        assert_eq!(config.download.audio_format, "m4a");
        assert!(config.model.path.ends_with("ggml-large-v3.bin"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(
            &path,
            "model:\n  path: /models/ggml-base.en.bin\ndownload:\n  ffmpeg_location: /opt/ffmpeg/bin/ffmpeg\noutput:\n  format: json\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model.path, PathBuf::from("/models/ggml-base.en.bin"));
        assert!(config.model.use_gpu);
        assert_eq!(config.download.ffmpeg_location, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(config.download.yt_dlp_path, "yt-dlp");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.transcription.chunk_seconds, 30);
    }

    #[test]
    fn test_zero_chunk_length_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "transcription:\n  chunk_seconds: 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
