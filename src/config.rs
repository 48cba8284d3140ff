//! Configuration parameters for gap detection

use crate::error::GapError;
use crate::preprocessing::silence::SilenceDetector;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Onset detection and scan configuration
///
/// Immutable for the duration of one scan and shared by reference across the
/// detector, expansion strategy and scanner. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    // Framing
    /// Analysis frame length (default: 25.0)
    pub frame_duration_ms: f64,

    /// Advance between consecutive frames (default: 10.0)
    pub hop_duration_ms: f64,

    // Thresholding
    /// Leading portion of each chunk used to estimate the noise floor (default: 1000.0)
    pub noise_floor_duration_ms: f64,

    /// Noise-floor standard deviations above the mean an onset must clear (default: 6.0)
    pub onset_snr_threshold: f64,

    /// Absolute RMS level an onset must clear regardless of noise floor (default: 0.02)
    pub onset_abs_threshold: f64,

    /// Minimum run of above-threshold energy to count as voiced (default: 300.0)
    /// Shorter bursts are treated as transients (instrument bleed, clicks)
    pub min_voiced_duration_ms: f64,

    /// Maximum lookback when refining an onset to its leading edge (default: 300.0)
    pub hysteresis_ms: f64,

    // Search windows
    /// Width of the first window centered on the expected gap (default: 15000.0)
    pub initial_window_ms: f64,

    /// Outward growth of each window edge per expansion (default: 7500.0)
    pub expansion_step_ms: f64,

    /// Widest window the scanner may reach before giving up (default: 60000.0)
    pub max_window_ms: f64,

    /// Cap on the first window's half-width (default: 30000.0)
    pub search_limit_ms: f64,

    /// Distance from the expected gap that counts as a match (default: 500.0)
    pub gap_tolerance_ms: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            frame_duration_ms: 25.0,
            hop_duration_ms: 10.0,
            noise_floor_duration_ms: 1000.0,
            onset_snr_threshold: 6.0,
            onset_abs_threshold: 0.02,
            min_voiced_duration_ms: 300.0,
            hysteresis_ms: 300.0,
            initial_window_ms: 15000.0,
            expansion_step_ms: 7500.0,
            max_window_ms: 60000.0,
            search_limit_ms: 30000.0,
            gap_tolerance_ms: 500.0,
        }
    }
}

impl DetectionConfig {
    /// Historical, more sensitive parameter set
    ///
    /// Shorter noise-floor window, lower thresholds and a shorter minimum
    /// voiced duration. Picks up quiet or breathy entries at the cost of more
    /// false onsets on bleed-heavy separations.
    pub fn sensitive() -> Self {
        Self {
            noise_floor_duration_ms: 500.0,
            onset_snr_threshold: 4.0,
            onset_abs_threshold: 0.01,
            min_voiced_duration_ms: 150.0,
            hysteresis_ms: 200.0,
            ..Self::default()
        }
    }

    /// Reject values that would make a scan meaningless
    ///
    /// Called at scan start, before any separation request is issued.
    pub fn validate(&self) -> Result<(), GapError> {
        let durations = [
            ("frame_duration_ms", self.frame_duration_ms),
            ("hop_duration_ms", self.hop_duration_ms),
            ("noise_floor_duration_ms", self.noise_floor_duration_ms),
            ("min_voiced_duration_ms", self.min_voiced_duration_ms),
            ("hysteresis_ms", self.hysteresis_ms),
            ("initial_window_ms", self.initial_window_ms),
            ("expansion_step_ms", self.expansion_step_ms),
            ("max_window_ms", self.max_window_ms),
            ("search_limit_ms", self.search_limit_ms),
            ("gap_tolerance_ms", self.gap_tolerance_ms),
        ];
        for (name, value) in durations {
            check_non_negative(name, value)?;
        }

        let positive = [
            ("frame_duration_ms", self.frame_duration_ms),
            ("hop_duration_ms", self.hop_duration_ms),
            ("initial_window_ms", self.initial_window_ms),
            ("max_window_ms", self.max_window_ms),
            ("search_limit_ms", self.search_limit_ms),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(GapError::Configuration(format!(
                    "{} must be > 0, got {}",
                    name, value
                )));
            }
        }

        check_non_negative("onset_snr_threshold", self.onset_snr_threshold)?;
        check_non_negative("onset_abs_threshold", self.onset_abs_threshold)?;

        Ok(())
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), GapError> {
    if !value.is_finite() {
        return Err(GapError::Configuration(format!(
            "{} must be finite, got {}",
            name, value
        )));
    }
    if value < 0.0 {
        return Err(GapError::Configuration(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Configuration surface consumed from the host application
///
/// Everything the pipeline needs from outside the core, passed explicitly
/// into [`crate::perform`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Scratch directory for intermediate vocal artifacts
    /// (default: `<system temp>/vocal-gap`)
    pub tmp_root: PathBuf,

    /// Detection method identifier, informational only (default: "scan")
    pub method: String,

    /// Seconds analysed from the track start when no gap is stored (default: 30)
    pub default_detection_time: u64,

    /// Recompute vocals even when an extracted artifact exists (default: false)
    pub overwrite: bool,

    /// Onset detection and scan parameters
    pub detection: DetectionConfig,

    /// Full-track silence detection parameters
    pub silence: SilenceDetector,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            tmp_root: std::env::temp_dir().join("vocal-gap"),
            method: "scan".to_string(),
            default_detection_time: 30,
            overwrite: false,
            detection: DetectionConfig::default(),
            silence: SilenceDetector::default(),
        }
    }
}

impl GapConfig {
    /// Validate every nested section
    pub fn validate(&self) -> Result<(), GapError> {
        if self.method.trim().is_empty() {
            return Err(GapError::Configuration(
                "method must not be empty".to_string(),
            ));
        }
        if self.default_detection_time == 0 {
            return Err(GapError::Configuration(
                "default_detection_time must be > 0".to_string(),
            ));
        }
        self.detection.validate()?;
        self.silence.validate()
    }

    /// Detection parameters for a song whose stored gap is `expected_gap_ms`
    ///
    /// A stored gap of 0 means "unknown": the first window then covers the
    /// first `default_detection_time` seconds of the track instead of the
    /// configured initial window.
    pub fn detection_for(&self, expected_gap_ms: u64) -> DetectionConfig {
        if expected_gap_ms > 0 {
            return self.detection.clone();
        }
        let fallback_ms = self.default_detection_time as f64 * 1000.0;
        DetectionConfig {
            initial_window_ms: fallback_ms * 2.0,
            search_limit_ms: self.detection.search_limit_ms.max(fallback_ms),
            max_window_ms: self.detection.max_window_ms.max(fallback_ms * 2.0),
            ..self.detection.clone()
        }
    }
}
