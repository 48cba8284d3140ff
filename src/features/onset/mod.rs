//! Onset detection modules
//!
//! Energy-based vocal onset detection on isolated vocals:
//! - Frame-wise RMS energy
//! - Noise-floor estimation and combined thresholding
//! - Sustained-onset detection with leading-edge refinement

pub mod detector;
pub mod energy;
pub mod threshold;

use crate::io::TimeRange;
use serde::{Deserialize, Serialize};

/// A sustained onset found in one chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnsetEvent {
    /// Refined onset time in ms from track start
    pub onset_ms: f64,

    /// Start of the non-vocal stretch preceding the onset
    pub quiet_since_ms: f64,
}

/// Onset candidate collected by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnsetCandidate {
    /// Onset time in ms from track start
    pub timestamp_ms: f64,

    /// Range of the analysed waveform the onset was found in
    pub source_chunk_range: TimeRange,

    /// Start of the non-vocal stretch preceding the onset
    pub quiet_since_ms: f64,
}

impl OnsetCandidate {
    /// Build a candidate from a detector event
    pub fn from_event(event: &OnsetEvent, source_chunk_range: TimeRange) -> Self {
        Self {
            timestamp_ms: event.onset_ms,
            source_chunk_range,
            quiet_since_ms: event.quiet_since_ms,
        }
    }

    /// Absolute distance to `expected_gap_ms`
    pub fn distance_to(&self, expected_gap_ms: f64) -> f64 {
        (self.timestamp_ms - expected_gap_ms).abs()
    }
}
