//! Whisper speech-to-text through whisper-rs.

use std::path::PathBuf;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::{ModelLoader, SpeechModel, TranscriptionError};
use crate::audio::resample;
use crate::config::ModelConfig;

/// Sample rate Whisper models are trained on
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Loads GGML Whisper weights from a fixed path
#[derive(Debug, Clone)]
pub struct WhisperLoader {
    model_path: PathBuf,
    language: Option<String>,
    threads: Option<u16>,
    use_gpu: bool,
}

impl WhisperLoader {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            model_path: config.path.clone(),
            language: config.language.clone(),
            threads: config.threads,
            use_gpu: config.use_gpu,
        }
    }
}

impl ModelLoader for WhisperLoader {
    fn load(&self) -> Result<Box<dyn SpeechModel>, TranscriptionError> {
        let model_load = |reason: String| TranscriptionError::ModelLoad {
            path: self.model_path.display().to_string(),
            reason,
        };

        if !self.model_path.is_file() {
            return Err(model_load("model file not found".to_string()));
        }

        let path = self
            .model_path
            .to_str()
            .ok_or_else(|| model_load("model path is not valid UTF-8".to_string()))?;

        tracing::info!("Loading Whisper model from {}", path);

        let mut params = WhisperContextParameters::default();
        params.use_gpu(self.use_gpu);

        let ctx = WhisperContext::new_with_params(path, params).map_err(|e| model_load(e.to_string()))?;

        let name = self
            .model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "whisper".to_string());

        Ok(Box::new(WhisperModel {
            ctx,
            name,
            language: self.language.clone(),
            threads: self.threads,
        }))
    }
}

/// A loaded Whisper context
pub struct WhisperModel {
    ctx: WhisperContext,
    name: String,
    language: Option<String>,
    threads: Option<u16>,
}

impl SpeechModel for WhisperModel {
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> anyhow::Result<String> {
        let input = resample(samples, sample_rate, WHISPER_SAMPLE_RATE)?;

        let mut state = self.ctx.create_state()?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(self.language.as_deref().unwrap_or("auto")));
        params.set_translate(false);
        // chunks are decoded independently
        params.set_no_context(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        if let Some(threads) = self.threads {
            params.set_n_threads(i32::from(threads));
        }

        state.full(params, &input)?;

        let num_segments = state.full_n_segments()?;
        let mut text = String::new();
        for i in 0..num_segments {
            text.push_str(&state.full_get_segment_text(i)?);
        }

        Ok(text.trim().to_string())
    }

    fn model_name(&self) -> String {
        self.name.clone()
    }
}
