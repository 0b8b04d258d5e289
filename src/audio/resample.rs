use rubato::{FftFixedIn, Resampler};

const CHUNK_SIZE: usize = 1024;

/// Resample mono audio between two rates with rubato's FFT resampler.
///
/// The resampler's output delay is trimmed so the result lines up with the
/// input, and the output length is `ceil(len * to_rate / from_rate)`.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> anyhow::Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 2, 1)?;

    let expected = (samples.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected + delay);

    let mut position = 0;
    while samples.len() - position >= resampler.input_frames_next() {
        let frames = resampler.input_frames_next();
        let input: &[&[f32]] = &[&samples[position..position + frames]];
        let block = resampler.process(input, None)?;
        output.extend_from_slice(&block[0]);
        position += frames;
    }

    if position < samples.len() {
        let tail: &[&[f32]] = &[&samples[position..]];
        let block = resampler.process_partial(Some(tail), None)?;
        output.extend_from_slice(&block[0]);
    }

    // flush whatever is still buffered behind the delay
    while output.len() < expected + delay {
        let block = resampler.process_partial::<&[f32]>(None, None)?;
        if block[0].is_empty() {
            break;
        }
        output.extend_from_slice(&block[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected, 0.0);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000).unwrap(), samples);
    }

    #[test]
    fn test_downsample_length() {
        let samples = vec![0.0f32; 44_100 * 2 + 17];
        let out = resample(&samples, 44_100, 16_000).unwrap();
        assert_eq!(out.len(), (samples.len() * 16_000).div_ceil(44_100));
    }

    #[test]
    fn test_upsample_preserves_constant_signal() {
        let samples = vec![0.5f32; 8_000];
        let out = resample(&samples, 8_000, 16_000).unwrap();

        assert_eq!(out.len(), 16_000);
        // edges ring a little; the middle should stay at the input level
        let middle = &out[4_000..12_000];
        assert!(middle.iter().all(|s| (s - 0.5).abs() < 0.02));
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], 48_000, 16_000).unwrap().is_empty());
    }
}
