//! Frame-wise RMS energy
//!
//! Divides a chunk into overlapping frames (frame length, hop) and computes
//! the root-mean-square amplitude of each, which serves as the loudness proxy
//! for onset detection.

use crate::error::GapError;
use crate::io::WaveformChunk;

/// RMS energy per frame of one chunk
#[derive(Debug, Clone)]
pub struct EnergySeries {
    /// RMS value per frame, in time order
    pub values: Vec<f64>,
    /// Frame length in samples
    pub frame_len: usize,
    /// Hop length in samples
    pub hop_len: usize,
    start_ms: f64,
    sample_rate: u32,
}

impl EnergySeries {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// No frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Absolute start time of frame `index`
    pub fn frame_start_ms(&self, index: usize) -> f64 {
        self.start_ms + self.samples_to_ms(index * self.hop_len)
    }

    /// Absolute end time of frame `index`
    pub fn frame_end_ms(&self, index: usize) -> f64 {
        self.frame_start_ms(index) + self.samples_to_ms(self.frame_len)
    }

    /// Absolute center time of frame `index`
    pub fn frame_center_ms(&self, index: usize) -> f64 {
        self.frame_start_ms(index) + self.samples_to_ms(self.frame_len) * 0.5
    }

    /// Number of leading frames that fit entirely within `duration_ms`
    ///
    /// Always at least one frame, never more than the series holds.
    pub fn frames_within(&self, duration_ms: f64) -> usize {
        let span = (duration_ms.max(0.0) * self.sample_rate as f64 / 1000.0).round() as usize;
        let count = if span >= self.frame_len {
            (span - self.frame_len) / self.hop_len + 1
        } else {
            1
        };
        count.clamp(1, self.values.len().max(1))
    }

    fn samples_to_ms(&self, samples: usize) -> f64 {
        samples as f64 * 1000.0 / self.sample_rate as f64
    }
}

/// Compute RMS energy for each frame of `chunk`
///
/// # Errors
///
/// Returns `GapError::InvalidAudio` if the sample rate is zero or the chunk
/// is shorter than one frame
pub fn frame_rms(
    chunk: &WaveformChunk,
    frame_duration_ms: f64,
    hop_duration_ms: f64,
) -> Result<EnergySeries, GapError> {
    if chunk.sample_rate() == 0 {
        return Err(GapError::InvalidAudio(
            "Sample rate must be > 0".to_string(),
        ));
    }

    let samples = chunk.samples();
    let frame_len = chunk.ms_to_samples(frame_duration_ms).max(1);
    let hop_len = chunk.ms_to_samples(hop_duration_ms).max(1);

    if samples.len() < frame_len {
        return Err(GapError::InvalidAudio(format!(
            "Chunk {} has {} samples, shorter than one {}-sample frame",
            chunk.range(),
            samples.len(),
            frame_len
        )));
    }

    let num_frames = (samples.len() - frame_len) / hop_len + 1;
    let mut values = Vec::with_capacity(num_frames);

    for i in 0..num_frames {
        let start = i * hop_len;
        let frame = &samples[start..start + frame_len];
        // RMS: sqrt(mean(squared samples))
        let sum_sq: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
        values.push((sum_sq / frame_len as f64).sqrt());
    }

    Ok(EnergySeries {
        values,
        frame_len,
        hop_len,
        start_ms: chunk.start_ms() as f64,
        sample_rate: chunk.sample_rate(),
    })
}
