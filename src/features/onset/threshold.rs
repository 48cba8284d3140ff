//! Noise-floor estimation and onset thresholding
//!
//! The onset threshold combines a relative term (noise-floor mean plus a
//! multiple of its standard deviation) with an absolute level, and always
//! takes the larger of the two. Quiet separations are then bounded by the
//! absolute level while bleed-heavy ones are bounded by their own noise.

use super::energy::EnergySeries;

/// Statistics of frame energy over the leading part of a chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseFloor {
    /// Mean RMS energy
    pub mean: f64,
    /// Population standard deviation of RMS energy
    pub std_dev: f64,
    /// Number of frames the estimate is based on
    pub frames: usize,
}

/// Estimate the noise floor from the first `duration_ms` of the series
///
/// Uses at least one frame. An empty series yields an all-zero floor.
pub fn estimate_noise_floor(series: &EnergySeries, duration_ms: f64) -> NoiseFloor {
    if series.is_empty() {
        return NoiseFloor {
            mean: 0.0,
            std_dev: 0.0,
            frames: 0,
        };
    }

    let count = series.frames_within(duration_ms);
    let window = &series.values[..count];

    let mean = window.iter().sum::<f64>() / count as f64;
    let variance = window.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;

    NoiseFloor {
        mean,
        std_dev: variance.sqrt(),
        frames: count,
    }
}

/// Combined onset threshold
///
/// `max(mean + snr_multiplier * std_dev, abs_threshold)`
pub fn combined_threshold(floor: &NoiseFloor, snr_multiplier: f64, abs_threshold: f64) -> f64 {
    let relative = floor.mean + snr_multiplier * floor.std_dev;
    relative.max(abs_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::onset::energy::frame_rms;
    use crate::io::{TimeRange, WaveformChunk};

    #[test]
    fn test_noise_floor_of_constant_signal() {
        let chunk = WaveformChunk::new(TimeRange::new(0, 2000), 1000, vec![0.1; 2000]);
        let series = frame_rms(&chunk, 20.0, 10.0).unwrap();
        let floor = estimate_noise_floor(&series, 1000.0);

        assert!((floor.mean - 0.1).abs() < 1e-9);
        assert!(floor.std_dev < 1e-9);
        assert_eq!(floor.frames, 99);
    }

    #[test]
    fn test_noise_floor_ignores_later_frames() {
        let mut samples = vec![0.0f32; 2000];
        for s in samples.iter_mut().skip(1500) {
            *s = 0.9;
        }
        let chunk = WaveformChunk::new(TimeRange::new(0, 2000), 1000, samples);
        let series = frame_rms(&chunk, 20.0, 10.0).unwrap();
        let floor = estimate_noise_floor(&series, 1000.0);
        assert_eq!(floor.mean, 0.0);
    }

    #[test]
    fn test_combined_threshold_takes_relative_when_larger() {
        let floor = NoiseFloor {
            mean: 0.05,
            std_dev: 0.01,
            frames: 10,
        };
        // 0.05 + 6 * 0.01 = 0.11 > 0.02
        assert!((combined_threshold(&floor, 6.0, 0.02) - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_combined_threshold_takes_absolute_when_larger() {
        let floor = NoiseFloor {
            mean: 0.001,
            std_dev: 0.0005,
            frames: 10,
        };
        assert_eq!(combined_threshold(&floor, 6.0, 0.02), 0.02);
    }
}
