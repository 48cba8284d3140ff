//! Gap detection result types

use super::metadata::GapMetadata;
use crate::preprocessing::silence::SilencePeriod;
use serde::{Deserialize, Serialize};

/// Whether the detected gap agrees with the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapStatus {
    /// Within the gap tolerance
    Match,
    /// Outside the gap tolerance; the stored gap likely needs correcting
    Mismatch,
    /// Detection was cancelled; the detected gap carries no information
    Cancelled,
}

impl GapStatus {
    /// Classify a detection against the stored gap
    ///
    /// # Example
    ///
    /// ```
    /// use vocal_gap::analysis::result::GapStatus;
    ///
    /// assert_eq!(GapStatus::classify(5200.0, 5000, 500.0), GapStatus::Match);
    /// assert_eq!(GapStatus::classify(6000.0, 5000, 500.0), GapStatus::Mismatch);
    /// ```
    pub fn classify(detected_gap_ms: f64, expected_gap_ms: u64, tolerance_ms: f64) -> Self {
        if (detected_gap_ms - expected_gap_ms as f64).abs() <= tolerance_ms {
            GapStatus::Match
        } else {
            GapStatus::Mismatch
        }
    }
}

/// Complete gap detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapResult {
    /// Detected gap in ms from track start (0 when nothing was found)
    pub detected_gap_ms: f64,

    /// Gap stored in the song metadata
    pub expected_gap_ms: u64,

    /// Confidence (0.0-1.0)
    ///
    /// - High (>= 0.7): clear vocal rise at the detected gap
    /// - Medium (0.5-0.7)
    /// - Low (< 0.5): faint vocals or a weak contrast with the lead-in
    pub confidence: f32,

    /// Detection method that produced the result
    pub method_name: String,

    /// Match against the stored gap
    pub status: GapStatus,

    /// Silence periods the gap was selected from
    pub silence_periods: Vec<SilencePeriod>,

    /// Processing metadata
    pub metadata: GapMetadata,
}

impl GapResult {
    /// Signed difference `detected - expected` in ms
    pub fn difference_ms(&self) -> f64 {
        self.detected_gap_ms - self.expected_gap_ms as f64
    }

    /// Detected gap agrees with the stored one
    pub fn is_match(&self) -> bool {
        self.status == GapStatus::Match
    }

    /// Detection was cancelled before a gap was found
    pub fn is_cancelled(&self) -> bool {
        self.status == GapStatus::Cancelled
    }

    /// Check if confidence is high (>= 0.7)
    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= 0.7
    }

    /// Check if confidence is low (< 0.5)
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < 0.5
    }

    /// Check if confidence is medium (0.5-0.7)
    pub fn is_medium_confidence(&self) -> bool {
        !self.is_high_confidence() && !self.is_low_confidence()
    }

    /// "High", "Medium", or "Low"
    pub fn confidence_level(&self) -> &'static str {
        if self.is_high_confidence() {
            "High"
        } else if self.is_low_confidence() {
            "Low"
        } else {
            "Medium"
        }
    }
}
