use std::ops::Range;

/// A contiguous slice of a [`super::Waveform`], across all of its channels
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<'a> {
    index: usize,
    range: Range<usize>,
    channels: Vec<&'a [f32]>,
    sample_rate: u32,
}

impl<'a> Chunk<'a> {
    pub(crate) fn new(index: usize, range: Range<usize>, channels: Vec<&'a [f32]>, sample_rate: u32) -> Self {
        Self {
            index,
            range,
            channels,
            sample_rate,
        }
    }

    /// Position of this chunk in the chunk sequence
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sample range of the parent waveform covered by this chunk
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&'a [f32]> {
        self.channels.get(index).copied()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn start_secs(&self) -> f64 {
        self.range.start as f64 / self.sample_rate as f64
    }

    pub fn end_secs(&self) -> f64 {
        self.range.end as f64 / self.sample_rate as f64
    }
}

/// Partition `0..total_samples` into consecutive windows of `window` samples.
///
/// Every range is exactly `window` long except possibly the last one. An empty
/// input yields no ranges. A zero window is treated as a single sample.
pub fn chunk_ranges(total_samples: usize, window: usize) -> Vec<Range<usize>> {
    let window = window.max(1);

    (0..total_samples)
        .step_by(window)
        .map(|start| start..(start + window).min(total_samples))
        .collect()
}
