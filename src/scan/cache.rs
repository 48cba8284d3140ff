//! Per-song memo of separated vocals

use crate::error::GapError;
use crate::io::{TimeRange, WaveformChunk};
use std::collections::HashMap;
use std::sync::Arc;

/// Separated vocals keyed by exact time range
///
/// Lives for one song session and is never shared across songs or persisted.
/// A single scan touches only a handful of ranges, so there is no eviction.
#[derive(Debug, Default)]
pub struct VocalsCache {
    entries: HashMap<TimeRange, Arc<WaveformChunk>>,
    hits: usize,
    misses: usize,
}

impl VocalsCache {
    /// Empty cache for a new song
    pub fn new() -> Self {
        Self::default()
    }

    /// Vocals for `range`, separating on a miss
    ///
    /// On a hit `separate` is not called. On a miss it is called exactly once
    /// and its result stored under `range`. Separation errors are returned
    /// unchanged and nothing is stored.
    pub fn get_or_separate<F>(
        &mut self,
        range: TimeRange,
        separate: F,
    ) -> Result<Arc<WaveformChunk>, GapError>
    where
        F: FnOnce(TimeRange) -> Result<WaveformChunk, GapError>,
    {
        if let Some(chunk) = self.entries.get(&range) {
            self.hits += 1;
            log::debug!("Vocals cache hit for {}", range);
            return Ok(Arc::clone(chunk));
        }

        log::debug!("Vocals cache miss for {}, separating", range);
        let chunk = Arc::new(separate(range)?);
        self.misses += 1;
        self.entries.insert(range, Arc::clone(&chunk));
        Ok(chunk)
    }

    /// Cached vocals for `range`, without separating
    pub fn get(&self, range: &TimeRange) -> Option<Arc<WaveformChunk>> {
        self.entries.get(range).cloned()
    }

    /// Number of distinct cached ranges
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Nothing cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups served from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that required separation
    pub fn misses(&self) -> usize {
        self.misses
    }
}
