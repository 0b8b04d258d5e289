use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

pub mod chunk;
pub mod resample;

pub use chunk::{chunk_ranges, Chunk};
pub use resample::resample;

/// Errors raised while turning an audio file into a [`Waveform`]
#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("Cannot open audio file {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unrecognised audio container: {0}")]
    Probe(String),

    #[error("No supported audio track found")]
    NoAudioTrack,

    #[error("Audio track does not declare a sample rate")]
    UnknownSampleRate,

    #[error("Audio decoding failed: {0}")]
    Decode(String),

    #[error("Invalid waveform: {0}")]
    InvalidShape(String),
}

/// Decoded audio as a channels × samples buffer with its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Waveform {
    /// Build a waveform, checking that every channel has the same length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidShape("sample rate must be positive".to_string()));
        }

        if let Some(first) = channels.first() {
            let expected = first.len();
            if let Some((index, channel)) = channels
                .iter()
                .enumerate()
                .find(|(_, channel)| channel.len() != expected)
            {
                return Err(AudioError::InvalidShape(format!(
                    "channel {} has {} samples, expected {}",
                    index,
                    channel.len(),
                    expected
                )));
            }
        }

        Ok(Self { channels, sample_rate })
    }

    /// Convenience constructor for single-channel audio
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        Self::new(vec![samples], sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_samples() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Average all channels into one. Single-channel audio is returned as is.
    pub fn into_mono(self) -> Self {
        match self.channels.len() {
            1 => self,
            0 => Self {
                channels: vec![Vec::new()],
                sample_rate: self.sample_rate,
            },
            count => {
                let len = self.num_samples();
                let mut mixed = vec![0.0f32; len];
                for channel in &self.channels {
                    for (acc, sample) in mixed.iter_mut().zip(channel) {
                        *acc += *sample;
                    }
                }
                let scale = 1.0 / count as f32;
                mixed.iter_mut().for_each(|s| *s *= scale);

                Self {
                    channels: vec![mixed],
                    sample_rate: self.sample_rate,
                }
            }
        }
    }

    /// Split into consecutive chunks of at most `max_duration_secs` seconds.
    pub fn chunks(&self, max_duration_secs: u32) -> Vec<Chunk<'_>> {
        let window = max_duration_secs as usize * self.sample_rate as usize;

        chunk_ranges(self.num_samples(), window)
            .into_iter()
            .enumerate()
            .map(|(index, range)| {
                let channels = self
                    .channels
                    .iter()
                    .map(|channel| &channel[range.clone()])
                    .collect();
                Chunk::new(index, range, channels, self.sample_rate)
            })
            .collect()
    }
}

/// Decode an audio file into a waveform, keeping every channel.
pub fn load_waveform(path: &Path) -> Result<Waveform, AudioError> {
    let file = std::fs::File::open(path).map_err(|source| AudioError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::Probe(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.ok_or(AudioError::UnknownSampleRate)?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let spec = *decoded.spec();
        let count = spec.channels.count();
        if count == 0 {
            continue;
        }
        if channels.is_empty() {
            channels = vec![Vec::new(); count];
        } else if channels.len() != count {
            return Err(AudioError::Decode(format!(
                "channel count changed mid-stream from {} to {}",
                channels.len(),
                count
            )));
        }

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);

        for frame in buffer.samples().chunks(count) {
            for (channel, sample) in channels.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }
    }

    let waveform = Waveform::new(channels, sample_rate)?;
    tracing::debug!(
        "Decoded {}: {} channel(s), {} samples at {} Hz",
        path.display(),
        waveform.num_channels(),
        waveform.num_samples(),
        waveform.sample_rate()
    );

    Ok(waveform)
}
