//! Confidence scoring for a detected gap
//!
//! Scores how clearly the vocals rise at the chosen onset: the RMS level just
//! after the onset is compared with the level just before it.
//!
//! # Algorithm
//!
//! 1. Pre level: RMS over `noise_floor_duration_ms` ending at the onset
//! 2. Post level: RMS over `min_voiced_duration_ms` starting at the onset
//! 3. Contrast in dB mapped linearly onto [0, 1], reaching 1.0 at 24 dB
//! 4. A post level below `onset_abs_threshold` scales the score down in
//!    proportion, since faint vocals are weak evidence however quiet the
//!    lead-in was
//!
//! # Example
//!
//! ```
//! use vocal_gap::analysis::confidence::compute_onset_confidence;
//! use vocal_gap::io::{TimeRange, WaveformChunk};
//! use vocal_gap::DetectionConfig;
//!
//! let samples: Vec<f32> = (0..4000).map(|i| if i >= 2000 { 0.5 } else { 0.0 }).collect();
//! let chunk = WaveformChunk::new(TimeRange::new(0, 4000), 1000, samples);
//!
//! let confidence = compute_onset_confidence(&chunk, 2000.0, &DetectionConfig::default());
//! assert!(confidence > 0.9);
//! ```

use crate::config::DetectionConfig;
use crate::io::WaveformChunk;

/// Contrast (dB) that earns full confidence
const FULL_SCALE_DB: f64 = 24.0;

const EPSILON: f64 = 1e-6;

/// Confidence (0.0-1.0) that `onset_ms` marks where vocals begin in `chunk`
///
/// Onsets outside the chunk, or with nothing after them, score 0.0.
pub fn compute_onset_confidence(
    chunk: &WaveformChunk,
    onset_ms: f64,
    config: &DetectionConfig,
) -> f32 {
    if chunk.is_empty() || !onset_ms.is_finite() || !chunk.range().contains(onset_ms) {
        log::debug!(
            "Onset {:.1} ms outside analysed vocals {}, confidence 0",
            onset_ms,
            chunk.range()
        );
        return 0.0;
    }

    let pre = region_rms(chunk, onset_ms - config.noise_floor_duration_ms, onset_ms);
    let post = match region_rms(chunk, onset_ms, onset_ms + config.min_voiced_duration_ms) {
        Some(level) => level,
        None => return 0.0,
    };
    let pre = pre.unwrap_or(0.0);

    let contrast_db = 20.0 * ((post + EPSILON) / (pre + EPSILON)).log10();
    let mut score = (contrast_db / FULL_SCALE_DB).clamp(0.0, 1.0);

    if config.onset_abs_threshold > 0.0 && post < config.onset_abs_threshold {
        score *= post / config.onset_abs_threshold;
    }

    log::debug!(
        "Onset confidence at {:.1} ms: pre={:.5}, post={:.5}, contrast={:.1} dB, score={:.3}",
        onset_ms,
        pre,
        post,
        contrast_db,
        score
    );

    score.clamp(0.0, 1.0) as f32
}

/// RMS of the samples between two absolute times, `None` if no samples fall inside
fn region_rms(chunk: &WaveformChunk, from_ms: f64, to_ms: f64) -> Option<f64> {
    let start = chunk.index_at(from_ms);
    let end = chunk.index_at(to_ms);
    if end <= start {
        return None;
    }

    let region = &chunk.samples()[start..end];
    let sum_sq: f64 = region.iter().map(|&x| (x as f64) * (x as f64)).sum();
    Some((sum_sq / region.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TimeRange;

    fn step(total_ms: u64, onset_ms: u64, before: f32, after: f32) -> WaveformChunk {
        let samples = (0..total_ms)
            .map(|t| if t >= onset_ms { after } else { before })
            .collect();
        WaveformChunk::new(TimeRange::new(0, total_ms), 1000, samples)
    }

    #[test]
    fn test_clean_onset_full_confidence() {
        let chunk = step(4000, 2000, 0.0, 0.5);
        let confidence = compute_onset_confidence(&chunk, 2000.0, &DetectionConfig::default());
        assert!((confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_weak_contrast_scores_lower() {
        // 6 dB rise over a loud lead-in
        let chunk = step(4000, 2000, 0.25, 0.5);
        let confidence = compute_onset_confidence(&chunk, 2000.0, &DetectionConfig::default());
        assert!(confidence > 0.2 && confidence < 0.3, "confidence {}", confidence);
    }

    #[test]
    fn test_faint_vocals_scaled_down() {
        let config = DetectionConfig::default();
        let chunk = step(4000, 2000, 0.0, 0.01);
        let confidence = compute_onset_confidence(&chunk, 2000.0, &config);
        // Full contrast, but half the absolute threshold
        assert!((confidence - 0.5).abs() < 1e-3, "confidence {}", confidence);
    }

    #[test]
    fn test_no_rise_zero() {
        let chunk = step(4000, 2000, 0.5, 0.5);
        assert_eq!(compute_onset_confidence(&chunk, 2000.0, &DetectionConfig::default()), 0.0);
    }

    #[test]
    fn test_onset_outside_chunk() {
        let chunk = step(4000, 2000, 0.0, 0.5);
        let config = DetectionConfig::default();
        assert_eq!(compute_onset_confidence(&chunk, 9000.0, &config), 0.0);
        assert_eq!(compute_onset_confidence(&chunk, f64::NAN, &config), 0.0);
    }

    #[test]
    fn test_onset_at_chunk_end() {
        let chunk = step(4000, 2000, 0.0, 0.5);
        assert_eq!(compute_onset_confidence(&chunk, 4000.0, &DetectionConfig::default()), 0.0);
    }
}
