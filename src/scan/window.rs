//! Search windows and their expansion
//!
//! The first window is centered on the expected gap rather than taken from
//! the start of the track, so a gap late in the song is reachable on the
//! first pass. Each expansion pushes both edges outward by a fixed step.

use crate::config::DetectionConfig;
use crate::io::TimeRange;
use serde::{Deserialize, Serialize};

/// Band of the track analysed in one scan iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    /// Band start in ms
    pub band_start_ms: u64,
    /// Band end in ms
    pub band_end_ms: u64,
    /// 0 for the initial window, +1 per expansion
    pub iteration_index: usize,
}

impl SearchWindow {
    /// Band as a time range
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.band_start_ms, self.band_end_ms)
    }

    /// Band width
    pub fn width_ms(&self) -> u64 {
        self.band_end_ms.saturating_sub(self.band_start_ms)
    }
}

/// Produces the initial window and each widened successor
#[derive(Debug, Clone)]
pub struct ExpansionStrategy {
    expected_gap_ms: u64,
    total_duration_ms: u64,
    half_width_ms: u64,
    step_ms: u64,
    max_window_ms: u64,
}

impl ExpansionStrategy {
    /// Strategy for one scan of a `total_duration_ms` track
    pub fn new(config: &DetectionConfig, expected_gap_ms: u64, total_duration_ms: u64) -> Self {
        let half_width = (config.initial_window_ms / 2.0).min(config.search_limit_ms);
        Self {
            expected_gap_ms,
            total_duration_ms,
            half_width_ms: to_ms(half_width),
            step_ms: to_ms(config.expansion_step_ms),
            max_window_ms: to_ms(config.max_window_ms),
        }
    }

    /// Window centered on the expected gap, clamped to the track
    pub fn initial(&self) -> SearchWindow {
        let center = self.expected_gap_ms.min(self.total_duration_ms);
        let window = SearchWindow {
            band_start_ms: center.saturating_sub(self.half_width_ms),
            band_end_ms: center
                .saturating_add(self.half_width_ms)
                .min(self.total_duration_ms),
            iteration_index: 0,
        };

        log::debug!(
            "Initial search window {} around expected gap {} ms",
            window.range(),
            self.expected_gap_ms
        );

        window
    }

    /// Next, wider window, or `None` once expansion is exhausted
    ///
    /// Exhausted means the widened band would exceed the maximum window, or
    /// both edges already sit at the track boundaries.
    pub fn expand(&self, previous: &SearchWindow) -> Option<SearchWindow> {
        let next = SearchWindow {
            band_start_ms: previous.band_start_ms.saturating_sub(self.step_ms),
            band_end_ms: previous
                .band_end_ms
                .saturating_add(self.step_ms)
                .min(self.total_duration_ms),
            iteration_index: previous.iteration_index + 1,
        };

        if next.band_start_ms == previous.band_start_ms && next.band_end_ms == previous.band_end_ms {
            log::debug!("Search window {} cannot grow further", previous.range());
            return None;
        }

        if next.width_ms() > self.max_window_ms {
            log::debug!(
                "Expanding to {} would exceed the {} ms maximum window",
                next.range(),
                self.max_window_ms
            );
            return None;
        }

        log::debug!(
            "Expanded search window to {} (iteration {})",
            next.range(),
            next.iteration_index
        );

        Some(next)
    }
}

fn to_ms(value: f64) -> u64 {
    value.max(0.0).round() as u64
}
