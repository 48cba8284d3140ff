//! Silence-period detection on isolated vocals
//!
//! Used by providers that scan the whole extracted vocal track instead of
//! driving the windowed scanner. Frames are non-overlapping; a frame is
//! silent when its RMS level in dBFS is below the threshold, and runs of
//! silent frames at least `min_duration_ms` long become silence periods.

use crate::error::GapError;
use crate::io::WaveformChunk;
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-10;

/// A contiguous region judged non-vocal, in ms from track start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilencePeriod {
    /// Region start
    pub start_ms: f64,
    /// Region end
    pub end_ms: f64,
}

impl SilencePeriod {
    /// Create a period, swapping endpoints if given in reverse
    pub fn new(start_ms: f64, end_ms: f64) -> Self {
        Self {
            start_ms: start_ms.min(end_ms),
            end_ms: start_ms.max(end_ms),
        }
    }

    /// Period length
    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }
}

/// Silence detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceDetector {
    /// Threshold in dBFS (default: -40.0)
    pub threshold_db: f32,

    /// Minimum duration in milliseconds (default: 500)
    pub min_duration_ms: u32,

    /// Analysis frame length in milliseconds (default: 20.0)
    pub frame_duration_ms: f64,
}

impl Default for SilenceDetector {
    fn default() -> Self {
        Self {
            threshold_db: -40.0,
            min_duration_ms: 500,
            frame_duration_ms: 20.0,
        }
    }
}

impl SilenceDetector {
    /// Reject non-finite thresholds and non-positive frame lengths
    pub fn validate(&self) -> Result<(), GapError> {
        if !self.threshold_db.is_finite() {
            return Err(GapError::Configuration(format!(
                "silence threshold_db must be finite, got {}",
                self.threshold_db
            )));
        }
        if !self.frame_duration_ms.is_finite() || self.frame_duration_ms <= 0.0 {
            return Err(GapError::Configuration(format!(
                "silence frame_duration_ms must be > 0, got {}",
                self.frame_duration_ms
            )));
        }
        Ok(())
    }
}

/// Detect silence periods in a vocals chunk
///
/// # Arguments
///
/// * `chunk` - Isolated vocals
/// * `detector` - Silence detection configuration
///
/// # Returns
///
/// Silence periods in time order, in absolute ms
///
/// # Errors
///
/// Returns `GapError::Configuration` for an invalid detector and
/// `GapError::InvalidAudio` for a chunk with a zero sample rate
pub fn detect_silence_periods(
    chunk: &WaveformChunk,
    detector: &SilenceDetector,
) -> Result<Vec<SilencePeriod>, GapError> {
    detector.validate()?;
    if chunk.sample_rate() == 0 {
        return Err(GapError::InvalidAudio(
            "Sample rate must be > 0".to_string(),
        ));
    }

    let samples = chunk.samples();
    let frame_len = chunk.ms_to_samples(detector.frame_duration_ms).max(1);

    log::debug!(
        "Detecting silence in {} samples ({}), frame={}, threshold={:.1} dB",
        samples.len(),
        chunk.range(),
        frame_len,
        detector.threshold_db
    );

    let mut periods = Vec::new();
    let mut run_start: Option<usize> = None;

    for (frame_idx, frame) in samples.chunks(frame_len).enumerate() {
        let start = frame_idx * frame_len;
        let sum_sq: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
        let rms = (sum_sq / frame.len() as f64).sqrt();
        let level_db = 20.0 * (rms + EPSILON).log10();

        if level_db < detector.threshold_db as f64 {
            run_start.get_or_insert(start);
        } else if let Some(run) = run_start.take() {
            push_if_long_enough(&mut periods, chunk, run, start, detector);
        }
    }

    if let Some(run) = run_start {
        push_if_long_enough(&mut periods, chunk, run, samples.len(), detector);
    }

    log::debug!("Found {} silence periods", periods.len());

    Ok(periods)
}

fn push_if_long_enough(
    periods: &mut Vec<SilencePeriod>,
    chunk: &WaveformChunk,
    start: usize,
    end: usize,
    detector: &SilenceDetector,
) {
    let start_ms = chunk.time_at(start);
    let end_ms = chunk.time_at(end);
    if end_ms - start_ms >= detector.min_duration_ms as f64 {
        periods.push(SilencePeriod::new(start_ms, end_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TimeRange;

    const SR: u32 = 16000;

    /// Silence, then a 200 Hz tone between `voiced_from_ms` and `voiced_to_ms`
    fn voiced_between(total_ms: u64, voiced_from_ms: u64, voiced_to_ms: u64) -> WaveformChunk {
        let len = (total_ms * SR as u64 / 1000) as usize;
        let from = (voiced_from_ms * SR as u64 / 1000) as usize;
        let to = (voiced_to_ms * SR as u64 / 1000) as usize;
        let samples = (0..len)
            .map(|i| {
                if i >= from && i < to {
                    (2.0 * std::f32::consts::PI * 200.0 * i as f32 / SR as f32).sin() * 0.5
                } else {
                    0.0
                }
            })
            .collect();
        WaveformChunk::new(TimeRange::new(0, total_ms), SR, samples)
    }

    #[test]
    fn test_leading_and_trailing_silence() {
        let chunk = voiced_between(10_000, 3000, 7000);
        let periods = detect_silence_periods(&chunk, &SilenceDetector::default()).unwrap();

        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].start_ms, 0.0);
        assert!((periods[0].end_ms - 3000.0).abs() <= 20.0);
        assert!((periods[1].start_ms - 7000.0).abs() <= 20.0);
        assert!((periods[1].end_ms - 10_000.0).abs() < 1.0);
    }

    #[test]
    fn test_short_pause_ignored() {
        // 200 ms pause inside vocals is below the 500 ms minimum
        let len = 5 * SR as usize;
        let pause = (2000 * SR / 1000) as usize..(2200 * SR / 1000) as usize;
        let samples = (0..len)
            .map(|i| {
                if pause.contains(&i) {
                    0.0
                } else {
                    (2.0 * std::f32::consts::PI * 200.0 * i as f32 / SR as f32).sin() * 0.5
                }
            })
            .collect();
        let chunk = WaveformChunk::new(TimeRange::new(0, 5000), SR, samples);

        let periods = detect_silence_periods(&chunk, &SilenceDetector::default()).unwrap();
        assert!(periods.is_empty(), "Got {:?}", periods);
    }

    #[test]
    fn test_vocals_from_start_has_no_leading_period() {
        let chunk = voiced_between(4000, 0, 4000);
        let periods = detect_silence_periods(&chunk, &SilenceDetector::default()).unwrap();
        assert!(periods.is_empty());
    }

    #[test]
    fn test_offsets_are_absolute() {
        let base = voiced_between(3000, 1000, 3000);
        let shifted = WaveformChunk::new(
            TimeRange::new(20_000, 23_000),
            SR,
            base.samples().to_vec(),
        );
        let periods = detect_silence_periods(&shifted, &SilenceDetector::default()).unwrap();
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start_ms, 20_000.0);
        assert!((periods[0].end_ms - 21_000.0).abs() <= 20.0);
    }

    #[test]
    fn test_invalid_detector_rejected() {
        let chunk = voiced_between(1000, 0, 500);
        let detector = SilenceDetector {
            frame_duration_ms: 0.0,
            ..SilenceDetector::default()
        };
        assert!(matches!(
            detect_silence_periods(&chunk, &detector),
            Err(GapError::Configuration(_))
        ));
    }
}
