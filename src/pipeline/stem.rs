//! Backend over vocals stems that were separated ahead of time

use super::provider::SeparationBackend;
use crate::error::GapError;
use crate::io::wav::read_wav;
use crate::io::{TimeRange, WaveformChunk};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Treats the song's audio file as an already isolated vocals WAV
///
/// Useful for stems produced by an external separator and for tests. The
/// most recently used stem stays loaded between requests.
#[derive(Debug, Default)]
pub struct StemFileBackend {
    loaded: Option<(PathBuf, Arc<WaveformChunk>)>,
    separations: usize,
}

impl StemFileBackend {
    /// Backend with nothing loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `separate` calls served
    pub fn separations(&self) -> usize {
        self.separations
    }

    fn load(&mut self, audio_path: &Path) -> Result<Arc<WaveformChunk>, GapError> {
        if let Some((path, chunk)) = &self.loaded {
            if path == audio_path {
                return Ok(Arc::clone(chunk));
            }
        }
        let chunk = Arc::new(read_wav(audio_path, 0)?);
        self.loaded = Some((audio_path.to_path_buf(), Arc::clone(&chunk)));
        Ok(chunk)
    }
}

impl SeparationBackend for StemFileBackend {
    fn name(&self) -> &str {
        "stem"
    }

    fn track_duration_ms(&mut self, audio_path: &Path) -> Result<u64, GapError> {
        Ok(self.load(audio_path)?.end_ms())
    }

    fn separate(&mut self, audio_path: &Path, range: TimeRange) -> Result<WaveformChunk, GapError> {
        self.separations += 1;
        Ok(self.load(audio_path)?.slice(range))
    }
}
