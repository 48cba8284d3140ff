//! Separation requests per search window
//!
//! The first window is requested whole. Each expansion only adds the strips
//! on either side that earlier windows did not cover, so a range is never
//! issued twice within one scan.

use super::window::SearchWindow;
use crate::io::TimeRange;
use std::collections::HashSet;

/// Tracks which parts of the track one scan has already requested
#[derive(Debug, Default)]
pub struct ChunkIterator {
    covered: Option<TimeRange>,
    issued: HashSet<TimeRange>,
}

impl ChunkIterator {
    /// Iterator for a fresh scan
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranges to request so that `window` is fully covered, in time order
    pub fn next_ranges(&mut self, window: &SearchWindow) -> Vec<TimeRange> {
        let band = window.range();
        if band.is_empty() {
            return Vec::new();
        }

        let candidates = match self.covered {
            None => vec![band],
            Some(covered) => {
                let mut strips = Vec::with_capacity(2);
                if band.start_ms() < covered.start_ms() {
                    strips.push(TimeRange::new(band.start_ms(), covered.start_ms()));
                }
                if band.end_ms() > covered.end_ms() {
                    strips.push(TimeRange::new(covered.end_ms(), band.end_ms()));
                }
                strips
            }
        };

        self.covered = Some(match self.covered {
            None => band,
            Some(covered) => TimeRange::new(
                covered.start_ms().min(band.start_ms()),
                covered.end_ms().max(band.end_ms()),
            ),
        });

        candidates
            .into_iter()
            .filter(|range| !range.is_empty() && self.issued.insert(*range))
            .collect()
    }
}
