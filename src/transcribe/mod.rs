use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::extractors::{validate_url, DownloadedMedia, MediaFetcher, MediaMode, YtDlpFetcher};
use crate::output;
use crate::TranscriptorError;

pub mod whisper;

pub use whisper::{WhisperLoader, WhisperModel};

/// Transcription result with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// One segment per audio chunk, in chunk order
    pub segments: Vec<TranscriptSegment>,

    /// URL the audio was fetched from
    pub source_url: String,

    /// Local audio file that was transcribed
    pub audio_path: PathBuf,

    /// Model that produced the text
    pub model: String,

    /// Length of the decoded audio in seconds
    pub audio_duration: f64,

    /// Timestamp when transcription completed
    pub completed_at: DateTime<Utc>,
}

/// Text decoded from one chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Chunk index
    pub index: usize,

    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Trimmed chunk text
    pub text: String,
}

impl Transcript {
    /// Plain text: every chunk's text on its own line
    pub fn text(&self) -> String {
        self.segments.iter().fold(String::new(), |mut acc, segment| {
            acc.push_str(&segment.text);
            acc.push('\n');
            acc
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TranscriptionError {
    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    #[error(transparent)]
    Audio(#[from] audio::AudioError),

    #[error("Inference failed on chunk {chunk}: {reason}")]
    Inference { chunk: usize, reason: String },

    #[error("Transcription worker stopped: {0}")]
    Worker(String),
}

/// A loaded speech-to-text model
#[cfg_attr(test, mockall::automock)]
pub trait SpeechModel: Send + Sync {
    /// Transcribe mono samples recorded at `sample_rate`
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> anyhow::Result<String>;

    fn model_name(&self) -> String;
}

/// Loads a [`SpeechModel`]; called once per run
#[cfg_attr(test, mockall::automock)]
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn SpeechModel>, TranscriptionError>;
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub transcript: Transcript,

    /// Where the transcript was written
    pub transcript_path: PathBuf,

    /// Downloaded audio, if it was kept
    pub audio_path: Option<PathBuf>,
}

/// Main transcription pipeline: fetch, decode, chunk, transcribe, save
pub struct TranscriptionPipeline {
    fetcher: Box<dyn MediaFetcher>,
    loader: Arc<dyn ModelLoader>,
    chunk_seconds: u32,
    output_dir: PathBuf,
    format: OutputFormat,
    keep_audio: bool,
}

impl TranscriptionPipeline {
    /// Create a pipeline using yt-dlp and Whisper
    pub fn new(config: &Config) -> Self {
        Self::with_components(
            Box::new(YtDlpFetcher::new(&config.download)),
            Arc::new(WhisperLoader::new(&config.model)),
            config,
        )
    }

    pub fn with_components(fetcher: Box<dyn MediaFetcher>, loader: Arc<dyn ModelLoader>, config: &Config) -> Self {
        Self {
            fetcher,
            loader,
            chunk_seconds: config.transcription.chunk_seconds,
            output_dir: config.output.directory.clone(),
            format: config.output.format,
            keep_audio: config.download.keep_audio,
        }
    }

    /// Run one download and transcription, writing the transcript file
    pub async fn run(&self, url: &str, mode: MediaMode) -> Result<RunOutcome> {
        let url = url.trim();
        validate_url(url)?;

        tracing::info!("Fetching {} with {} (mode {})", url, self.fetcher.name(), mode.menu_number());
        let media = self
            .fetcher
            .fetch(url, mode)
            .await
            .map_err(TranscriptorError::from)?;
        println!("Downloaded audio to: {}", media.path.display());

        let transcript = self
            .transcribe_media(&media, url)
            .await
            .map_err(TranscriptorError::from)?;

        let transcript_path = output::save_transcript(&transcript, &self.output_dir, self.format, Local::now())
            .map_err(|source| TranscriptorError::Output {
                dir: self.output_dir.display().to_string(),
                source,
            })?;

        let audio_path = if self.keep_audio {
            Some(media.path)
        } else {
            if let Err(e) = fs_err::remove_dir_all(&media.work_dir) {
                tracing::warn!("Could not remove {}: {}", media.work_dir.display(), e);
            }
            None
        };

        Ok(RunOutcome {
            transcript,
            transcript_path,
            audio_path,
        })
    }

    /// Transcribe a downloaded file on a blocking worker thread
    pub async fn transcribe_media(
        &self,
        media: &DownloadedMedia,
        source_url: &str,
    ) -> Result<Transcript, TranscriptionError> {
        let loader = Arc::clone(&self.loader);
        let path = media.path.clone();
        let chunk_seconds = self.chunk_seconds;
        let source_url = source_url.to_string();

        tokio::task::spawn_blocking(move || transcribe_file(loader.as_ref(), &path, chunk_seconds, source_url))
            .await
            .map_err(|e| TranscriptionError::Worker(e.to_string()))?
    }
}

/// Load the model, decode `path` to mono and transcribe it chunk by chunk.
pub fn transcribe_file(
    loader: &dyn ModelLoader,
    path: &Path,
    chunk_seconds: u32,
    source_url: String,
) -> Result<Transcript, TranscriptionError> {
    let model = loader.load()?;

    let waveform = audio::load_waveform(path)?.into_mono();
    let chunks = waveform.chunks(chunk_seconds);
    tracing::info!(
        "Transcribing {:.1}s of audio in {} chunk(s) of up to {}s",
        waveform.duration_secs(),
        chunks.len(),
        chunk_seconds
    );

    let mut segments = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        tracing::debug!("Chunk {}/{}: samples {:?}", chunk.index() + 1, chunks.len(), chunk.range());

        let samples = chunk.channel(0).unwrap_or_default();
        let text = model
            .transcribe(samples, chunk.sample_rate())
            .map_err(|e| TranscriptionError::Inference {
                chunk: chunk.index(),
                reason: format!("{:#}", e),
            })?;

        segments.push(TranscriptSegment {
            index: chunk.index(),
            start_time: chunk.start_secs(),
            end_time: chunk.end_secs(),
            text: text.trim().to_string(),
        });
    }

    Ok(Transcript {
        segments,
        source_url,
        audio_path: path.to_path_buf(),
        model: model.model_name(),
        audio_duration: waveform.duration_secs(),
        completed_at: Utc::now(),
    })
}
