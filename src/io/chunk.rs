//! Time ranges and immutable waveform chunks

use crate::error::GapError;
use crate::preprocessing::channel_mixer::downmix_interleaved;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Half-open time range `[start_ms, end_ms)` in whole milliseconds
///
/// Normalized on construction so that `start_ms <= end_ms`; two ranges
/// covering the same span are always equal, which makes this the identity key
/// for separation requests and cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawTimeRange")]
pub struct TimeRange {
    start_ms: u64,
    end_ms: u64,
}

/// Serialized form, normalized through [`TimeRange::new`] on the way in
#[derive(Deserialize)]
struct RawTimeRange {
    start_ms: u64,
    end_ms: u64,
}

impl From<RawTimeRange> for TimeRange {
    fn from(raw: RawTimeRange) -> Self {
        TimeRange::new(raw.start_ms, raw.end_ms)
    }
}

impl TimeRange {
    /// Create a normalized range from two endpoints in either order
    pub fn new(a_ms: u64, b_ms: u64) -> Self {
        Self {
            start_ms: a_ms.min(b_ms),
            end_ms: a_ms.max(b_ms),
        }
    }

    /// Range start (inclusive)
    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    /// Range end (exclusive)
    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    /// Span length
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Zero-length range
    pub fn is_empty(&self) -> bool {
        self.start_ms == self.end_ms
    }

    /// Whether `time_ms` lies inside the range (end inclusive)
    pub fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.start_ms as f64 && time_ms <= self.end_ms as f64
    }

    /// Intersection with `other`, if non-empty
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start_ms.max(other.start_ms);
        let end = self.end_ms.min(other.end_ms);
        (start < end).then(|| TimeRange::new(start, end))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} ms, {} ms)", self.start_ms, self.end_ms)
    }
}

/// A time-bounded slice of mono audio
///
/// Produced once by whoever requested it (a separation backend, a WAV reader,
/// a slice of a larger chunk) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformChunk {
    range: TimeRange,
    sample_rate: u32,
    samples: Vec<f32>,
}

impl WaveformChunk {
    /// Wrap mono samples that start at `range.start_ms()`
    pub fn new(range: TimeRange, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            range,
            sample_rate,
            samples,
        }
    }

    /// Build a chunk from interleaved multi-channel samples, downmixing to mono
    pub fn from_interleaved(
        range: TimeRange,
        sample_rate: u32,
        channels: u16,
        samples: &[f32],
    ) -> Result<Self, GapError> {
        let mono = downmix_interleaved(samples, channels)?;
        Ok(Self::new(range, sample_rate, mono))
    }

    /// Covered time range
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Chunk start in ms from track start
    pub fn start_ms(&self) -> u64 {
        self.range.start_ms
    }

    /// Chunk end in ms from track start
    pub fn end_ms(&self) -> u64 {
        self.range.end_ms
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Mono samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// No samples at all
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples spanned by `duration_ms` at this chunk's rate
    pub fn ms_to_samples(&self, duration_ms: f64) -> usize {
        (duration_ms.max(0.0) * self.sample_rate as f64 / 1000.0).round() as usize
    }

    /// Absolute time (ms from track start) of sample `index`
    pub fn time_at(&self, index: usize) -> f64 {
        if self.sample_rate == 0 {
            return self.range.start_ms as f64;
        }
        self.range.start_ms as f64 + index as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Sample index for absolute time `time_ms`, clamped to the chunk
    pub fn index_at(&self, time_ms: f64) -> usize {
        let offset = time_ms - self.range.start_ms as f64;
        self.ms_to_samples(offset).min(self.samples.len())
    }

    /// Copy of the part of this chunk inside `range`
    ///
    /// Returns an empty chunk when the ranges do not overlap.
    pub fn slice(&self, range: TimeRange) -> WaveformChunk {
        match self.range.intersect(&range) {
            Some(overlap) => {
                let start = self.index_at(overlap.start_ms as f64);
                let end = self.index_at(overlap.end_ms as f64).max(start);
                WaveformChunk::new(overlap, self.sample_rate, self.samples[start..end].to_vec())
            }
            None => WaveformChunk::new(
                TimeRange::new(range.start_ms, range.start_ms),
                self.sample_rate,
                Vec::new(),
            ),
        }
    }

    /// Join adjacent pieces (sorted by start time) into one chunk
    pub fn concat(pieces: &[Arc<WaveformChunk>]) -> Result<WaveformChunk, GapError> {
        let (first, last) = match (pieces.first(), pieces.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(GapError::InvalidAudio(
                    "Cannot join zero waveform pieces".to_string(),
                ))
            }
        };

        let sample_rate = first.sample_rate;
        let total_len: usize = pieces.iter().map(|p| p.len()).sum();
        let mut samples = Vec::with_capacity(total_len);

        for (i, piece) in pieces.iter().enumerate() {
            if piece.sample_rate != sample_rate {
                return Err(GapError::Separation(format!(
                    "Inconsistent sample rates across vocals pieces: {} Hz vs {} Hz",
                    sample_rate, piece.sample_rate
                )));
            }
            if i > 0 && pieces[i - 1].end_ms() != piece.start_ms() {
                log::warn!(
                    "Vocals pieces are not contiguous: {} then {}",
                    pieces[i - 1].range,
                    piece.range
                );
            }
            samples.extend_from_slice(&piece.samples);
        }

        Ok(WaveformChunk::new(
            TimeRange::new(first.start_ms(), last.end_ms()),
            sample_rate,
            samples,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_chunk(start_ms: u64, end_ms: u64, sample_rate: u32) -> WaveformChunk {
        let len = ((end_ms - start_ms) * sample_rate as u64 / 1000) as usize;
        let samples = (0..len).map(|i| i as f32).collect();
        WaveformChunk::new(TimeRange::new(start_ms, end_ms), sample_rate, samples)
    }

    #[test]
    fn test_time_range_normalizes() {
        assert_eq!(TimeRange::new(500, 100), TimeRange::new(100, 500));
        assert_eq!(TimeRange::new(500, 100).duration_ms(), 400);
    }

    #[test]
    fn test_time_range_deserialize_normalizes() {
        let range: TimeRange = serde_json::from_str(r#"{"start_ms": 10, "end_ms": 5}"#).unwrap();
        assert_eq!(range, TimeRange::new(5, 10));
        assert_eq!(range.duration_ms(), 5);

        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#"{"start_ms":5,"end_ms":10}"#);
    }

    #[test]
    fn test_time_range_intersect() {
        let a = TimeRange::new(0, 1000);
        let b = TimeRange::new(500, 2000);
        assert_eq!(a.intersect(&b), Some(TimeRange::new(500, 1000)));
        assert_eq!(a.intersect(&TimeRange::new(1000, 1500)), None);
    }

    #[test]
    fn test_time_mapping() {
        let chunk = ramp_chunk(2000, 3000, 1000);
        assert_eq!(chunk.len(), 1000);
        assert_eq!(chunk.time_at(250), 2250.0);
        assert_eq!(chunk.index_at(2250.0), 250);
        // Out-of-range times clamp
        assert_eq!(chunk.index_at(0.0), 0);
        assert_eq!(chunk.index_at(10_000.0), 1000);
    }

    #[test]
    fn test_slice_clamps_to_chunk() {
        let chunk = ramp_chunk(1000, 2000, 1000);
        let slice = chunk.slice(TimeRange::new(1500, 2500));
        assert_eq!(slice.range(), TimeRange::new(1500, 2000));
        assert_eq!(slice.len(), 500);
        assert_eq!(slice.samples()[0], 500.0);

        let empty = chunk.slice(TimeRange::new(5000, 6000));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_concat_joins_in_order() {
        let left = Arc::new(ramp_chunk(0, 500, 1000));
        let right = Arc::new(ramp_chunk(500, 1000, 1000));
        let joined = WaveformChunk::concat(&[left, right]).unwrap();
        assert_eq!(joined.range(), TimeRange::new(0, 1000));
        assert_eq!(joined.len(), 1000);
        assert_eq!(joined.samples()[500], 0.0);
    }

    #[test]
    fn test_concat_rejects_mixed_sample_rates() {
        let left = Arc::new(ramp_chunk(0, 500, 1000));
        let right = Arc::new(ramp_chunk(500, 1000, 2000));
        assert!(matches!(
            WaveformChunk::concat(&[left, right]),
            Err(GapError::Separation(_))
        ));
    }

    #[test]
    fn test_from_interleaved_downmixes() {
        let chunk =
            WaveformChunk::from_interleaved(TimeRange::new(0, 2), 1000, 2, &[1.0, 0.0, 0.5, 0.5])
                .unwrap();
        assert_eq!(chunk.samples(), &[0.5, 0.5]);
    }
}
