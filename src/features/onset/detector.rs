//! Sustained vocal onset detection
//!
//! Algorithm:
//! 1. Compute RMS energy per overlapping frame
//! 2. Estimate the noise floor (mean, std dev) over the chunk's leading portion
//! 3. Threshold = max(mean + snr * std_dev, absolute threshold)
//! 4. An onset is the first frame of an above-threshold run lasting at least
//!    the minimum voiced duration; shorter runs are transients
//! 5. Refine backwards (bounded by the hysteresis) over frames whose energy is
//!    still rising toward the onset, to land on the leading edge of a fade-in
//!
//! # Example
//!
//! ```
//! use vocal_gap::features::onset::detector::detect_onset;
//! use vocal_gap::io::{TimeRange, WaveformChunk};
//! use vocal_gap::DetectionConfig;
//!
//! let sr = 16000;
//! let samples: Vec<f32> = (0..sr * 3)
//!     .map(|i| if i >= sr * 2 { 0.5 } else { 0.0 })
//!     .collect();
//! let chunk = WaveformChunk::new(TimeRange::new(0, 3000), sr as u32, samples);
//!
//! let onset = detect_onset(&chunk, &DetectionConfig::default()).unwrap();
//! assert!((onset - 2000.0).abs() <= 50.0);
//! ```

use super::energy::{frame_rms, EnergySeries};
use super::threshold::{combined_threshold, estimate_noise_floor};
use super::OnsetEvent;
use crate::config::DetectionConfig;
use crate::io::WaveformChunk;

/// Noise-floor standard deviations a frame must clear to count as part of a rise
const REFINEMENT_FLOOR_SIGMAS: f64 = 2.0;

/// Detect the first sustained vocal onset in `chunk`
///
/// # Returns
///
/// Onset time in ms from track start, or `None` when the chunk holds no
/// sustained onset. Chunks shorter than one frame are reported as `None`
/// with a logged warning.
pub fn detect_onset(chunk: &WaveformChunk, config: &DetectionConfig) -> Option<f64> {
    detect_onsets(chunk, config)
        .first()
        .map(|event| event.onset_ms)
}

/// Detect every sustained vocal onset in `chunk`, in time order
///
/// Each onset after the first requires energy to have dropped below the
/// threshold since the previous sustained run. Each event records where the
/// quiet stretch before it began: the end of the previous sustained run, or
/// the chunk start.
pub fn detect_onsets(chunk: &WaveformChunk, config: &DetectionConfig) -> Vec<OnsetEvent> {
    let series = match frame_rms(chunk, config.frame_duration_ms, config.hop_duration_ms) {
        Ok(series) => series,
        Err(e) => {
            log::warn!("Skipping onset detection: {}", e);
            return Vec::new();
        }
    };

    let floor = estimate_noise_floor(&series, config.noise_floor_duration_ms);
    let threshold = combined_threshold(
        &floor,
        config.onset_snr_threshold,
        config.onset_abs_threshold,
    );

    log::debug!(
        "Onset detection over {}: {} frames, noise floor mean={:.5} std={:.5} ({} frames), threshold={:.5}",
        chunk.range(),
        series.len(),
        floor.mean,
        floor.std_dev,
        floor.frames,
        threshold
    );

    let values = &series.values;
    let mut events = Vec::new();
    let mut last_voiced_end: Option<f64> = None;
    let mut lower_bound = 0;
    let mut i = 0;

    while i < values.len() {
        if values[i] <= threshold {
            i += 1;
            continue;
        }

        let run_start = i;
        let mut run_end = i;
        while run_end + 1 < values.len() && values[run_end + 1] > threshold {
            run_end += 1;
        }

        let span_ms = series.frame_end_ms(run_end) - series.frame_start_ms(run_start);
        if span_ms >= config.min_voiced_duration_ms {
            let refined = refine_onset(
                &series,
                run_start,
                lower_bound,
                floor.mean + REFINEMENT_FLOOR_SIGMAS * floor.std_dev,
                config.hysteresis_ms,
            );
            let onset_ms = series.frame_start_ms(refined);
            let quiet_since_ms = last_voiced_end
                .unwrap_or(chunk.start_ms() as f64)
                .min(onset_ms);

            log::debug!(
                "Sustained onset at {:.1} ms (crossing centered at {:.1} ms, run {:.0} ms)",
                onset_ms,
                series.frame_center_ms(run_start),
                span_ms
            );

            events.push(OnsetEvent {
                onset_ms,
                quiet_since_ms,
            });
            last_voiced_end = Some(series.frame_end_ms(run_end));
            lower_bound = run_end + 1;
        } else {
            log::trace!(
                "Rejected {:.0} ms transient at {:.1} ms",
                span_ms,
                series.frame_start_ms(run_start)
            );
        }

        i = run_end + 1;
    }

    events
}

/// Walk back from `onset_idx` to the leading edge of a gradual rise
///
/// Moves one frame at a time while the earlier frame is within the
/// hysteresis window, has strictly lower energy, and still sits above
/// `floor_level`. Never crosses `lower_bound`.
fn refine_onset(
    series: &EnergySeries,
    onset_idx: usize,
    lower_bound: usize,
    floor_level: f64,
    hysteresis_ms: f64,
) -> usize {
    let limit_ms = series.frame_start_ms(onset_idx) - hysteresis_ms;
    let values = &series.values;
    let mut j = onset_idx;

    while j > lower_bound {
        let prev = j - 1;
        if series.frame_start_ms(prev) < limit_ms {
            break;
        }
        if values[prev] >= values[j] || values[prev] <= floor_level {
            break;
        }
        j = prev;
    }

    j
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TimeRange;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SR: u32 = 16000;

    /// 200 Hz tone: 80 samples per period, so 25 ms / 10 ms frames hold whole periods
    fn tone(i: usize) -> f32 {
        (2.0 * std::f32::consts::PI * 200.0 * i as f32 / SR as f32).sin()
    }

    fn ms_to_idx(ms: u64) -> usize {
        (ms * SR as u64 / 1000) as usize
    }

    fn chunk_from(total_ms: u64, envelope: impl Fn(u64) -> f32) -> WaveformChunk {
        let len = ms_to_idx(total_ms);
        let samples = (0..len)
            .map(|i| {
                let t_ms = i as u64 * 1000 / SR as u64;
                envelope(t_ms) * tone(i)
            })
            .collect();
        WaveformChunk::new(TimeRange::new(0, total_ms), SR, samples)
    }

    #[test]
    fn test_empty_chunk_not_found() {
        let chunk = WaveformChunk::new(TimeRange::new(0, 0), SR, vec![]);
        assert_eq!(detect_onset(&chunk, &DetectionConfig::default()), None);
    }

    #[test]
    fn test_shorter_than_frame_not_found() {
        // 10 ms < 25 ms frame
        let chunk = WaveformChunk::new(TimeRange::new(0, 10), SR, vec![0.8; ms_to_idx(10)]);
        assert_eq!(detect_onset(&chunk, &DetectionConfig::default()), None);
    }

    #[test]
    fn test_silence_not_found() {
        let chunk = chunk_from(3000, |_| 0.0);
        assert_eq!(detect_onset(&chunk, &DetectionConfig::default()), None);
    }

    #[test]
    fn test_abrupt_onset() {
        for &onset in &[1500u64, 2000, 2730, 4125] {
            let chunk = chunk_from(6000, |t| if t >= onset { 0.5 } else { 0.0 });
            let detected = detect_onset(&chunk, &DetectionConfig::default())
                .expect("abrupt onset should be detected");
            assert!(
                (detected - onset as f64).abs() <= 50.0,
                "Onset at {} detected at {:.1}",
                onset,
                detected
            );
        }
    }

    #[test]
    fn test_abrupt_onset_in_offset_chunk() {
        let base = chunk_from(4000, |t| if t >= 2500 { 0.5 } else { 0.0 });
        let chunk = WaveformChunk::new(
            TimeRange::new(30_000, 34_000),
            SR,
            base.samples().to_vec(),
        );
        let detected = detect_onset(&chunk, &DetectionConfig::default()).unwrap();
        assert!((detected - 32_500.0).abs() <= 50.0, "got {:.1}", detected);
    }

    #[test]
    fn test_fade_in_refined_to_leading_edge() {
        let onset = 2000u64;
        let fade = |t: u64| {
            if t < onset {
                0.0
            } else {
                0.5 * ((t - onset) as f32 / 1000.0).min(1.0)
            }
        };
        let chunk = chunk_from(6000, fade);
        // A high absolute threshold makes the raw crossing land ~280 ms into the fade
        let config = DetectionConfig {
            onset_abs_threshold: 0.1,
            hysteresis_ms: 400.0,
            ..DetectionConfig::default()
        };

        let refined = detect_onset(&chunk, &config).unwrap();
        assert!(
            (refined - onset as f64).abs() <= 200.0,
            "Refined onset {:.1} too far from fade start {}",
            refined,
            onset
        );

        let unrefined = detect_onset(
            &chunk,
            &DetectionConfig {
                hysteresis_ms: 0.0,
                ..config.clone()
            },
        )
        .unwrap();
        assert!(
            unrefined > onset as f64 + 200.0,
            "Threshold crossing expected late in the fade, got {:.1}",
            unrefined
        );
        assert!(refined < unrefined);
    }

    #[test]
    fn test_short_burst_rejected() {
        let chunk = chunk_from(4000, |t| if (2000..2100).contains(&t) { 0.5 } else { 0.0 });
        let config = DetectionConfig {
            min_voiced_duration_ms: 300.0,
            ..DetectionConfig::default()
        };
        assert_eq!(detect_onset(&chunk, &config), None);
    }

    #[test]
    fn test_burst_before_sustained_onset_is_skipped() {
        let chunk = chunk_from(6000, |t| {
            if (1500..1560).contains(&t) || t >= 3500 {
                0.5
            } else {
                0.0
            }
        });
        let events = detect_onsets(&chunk, &DetectionConfig::default());
        assert_eq!(events.len(), 1);
        assert!((events[0].onset_ms - 3500.0).abs() <= 50.0);
        // The burst is not voiced, so the quiet stretch starts at the chunk start
        assert_eq!(events[0].quiet_since_ms, 0.0);
    }

    #[test]
    fn test_two_phrases_yield_two_onsets() {
        let chunk = chunk_from(6000, |t| {
            if (1200..2000).contains(&t) || (3000..4500).contains(&t) {
                0.5
            } else {
                0.0
            }
        });
        let events = detect_onsets(&chunk, &DetectionConfig::default());
        assert_eq!(events.len(), 2);
        assert!((events[0].onset_ms - 1200.0).abs() <= 50.0);
        assert!((events[1].onset_ms - 3000.0).abs() <= 50.0);
        assert!((events[1].quiet_since_ms - 2000.0).abs() <= 50.0);
        assert!(events[1].quiet_since_ms <= events[1].onset_ms);
    }

    #[test]
    fn test_loud_noise_floor_uses_relative_threshold() {
        let mut rng = StdRng::seed_from_u64(7);
        let onset = 3000u64;
        let len = ms_to_idx(6000);
        let samples = (0..len)
            .map(|i| {
                let noise = rng.gen_range(-0.05f32..0.05);
                let voice = if i >= ms_to_idx(onset) { 0.5 * tone(i) } else { 0.0 };
                noise + voice
            })
            .collect();
        let chunk = WaveformChunk::new(TimeRange::new(0, 6000), SR, samples);

        // Noise RMS (~0.029) alone clears the 0.02 absolute threshold
        let detected = detect_onset(&chunk, &DetectionConfig::default()).unwrap();
        assert!(
            (detected - onset as f64).abs() <= 50.0,
            "Noise should not trigger an onset, got {:.1}",
            detected
        );
    }

    #[test]
    fn test_absolute_threshold_rejects_faint_vocals() {
        // Clean silence gives a zero noise floor; 0.01 amplitude stays under 0.02
        let chunk = chunk_from(4000, |t| if t >= 2000 { 0.01 } else { 0.0 });
        assert_eq!(detect_onset(&chunk, &DetectionConfig::default()), None);
    }
}
