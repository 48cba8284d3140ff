//! Separation capability consumed by the scanner

use crate::error::GapError;
use crate::io::{TimeRange, WaveformChunk};

/// "Get isolated vocals for a time range" for one song
///
/// Implemented by providers over a real separation backend, and by
/// [`InMemoryVocals`] for vocals that are already separated.
pub trait SeparationSource {
    /// Length of the song in ms
    fn total_duration_ms(&self) -> u64;

    /// Isolated vocals for `range`
    ///
    /// Failures are infrastructure errors and propagate out of the scan.
    fn separate(&mut self, range: TimeRange) -> Result<WaveformChunk, GapError>;

    /// Cooperative cancellation check, consulted before every request
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Separation source over a fully separated vocal track held in memory
#[derive(Debug, Clone)]
pub struct InMemoryVocals {
    vocals: WaveformChunk,
    requests: usize,
}

impl InMemoryVocals {
    /// Wrap a whole-track vocals chunk (expected to start at 0 ms)
    pub fn new(vocals: WaveformChunk) -> Self {
        Self { vocals, requests: 0 }
    }

    /// Number of ranges served so far
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// The wrapped vocals
    pub fn vocals(&self) -> &WaveformChunk {
        &self.vocals
    }
}

impl SeparationSource for InMemoryVocals {
    fn total_duration_ms(&self) -> u64 {
        self.vocals.end_ms()
    }

    fn separate(&mut self, range: TimeRange) -> Result<WaveformChunk, GapError> {
        self.requests += 1;
        Ok(self.vocals.slice(range))
    }
}
