//! Provider and separation-backend capabilities

use crate::config::DetectionConfig;
use crate::error::GapError;
use crate::io::{TimeRange, WaveformChunk};
use crate::preprocessing::silence::SilencePeriod;
use std::path::Path;

/// Source of isolated vocals and the silence periods within them
///
/// The pipeline drives a provider through three steps per song: extract
/// vocals, find silence periods near the expected gap, score the chosen gap.
pub trait VocalsProvider {
    /// Provider-specific handle to one song's vocals
    type Vocals;

    /// Short provider name, recorded in result metadata
    fn name(&self) -> &str;

    /// Extract (or reuse) the vocals of `audio_path`
    ///
    /// `overwrite = false` reuses an existing extracted artifact.
    fn get_vocals(&mut self, audio_path: &Path, overwrite: bool) -> Result<Self::Vocals, GapError>;

    /// Silence periods in the vocals, in time order
    ///
    /// `expected_gap_ms` lets scanning providers center their search.
    /// Providers that analyse the whole track may ignore it.
    fn detect_silence_periods(
        &mut self,
        vocals: &Self::Vocals,
        expected_gap_ms: u64,
        config: &DetectionConfig,
    ) -> Result<Vec<SilencePeriod>, GapError>;

    /// Whether the last `detect_silence_periods` call stopped on cancellation
    ///
    /// Periods returned by a cancelled call are incomplete and must not be
    /// read as "no vocals".
    fn was_cancelled(&self) -> bool {
        false
    }

    /// Confidence (0.0-1.0) that vocals begin at `candidate_ms`
    fn compute_confidence(
        &mut self,
        vocals: &Self::Vocals,
        candidate_ms: f64,
        config: &DetectionConfig,
    ) -> Result<f32, GapError>;
}

/// Vocal separation over audio files, consumed by the bundled providers
pub trait SeparationBackend {
    /// Short backend name
    fn name(&self) -> &str;

    /// Length of the track in ms
    fn track_duration_ms(&mut self, audio_path: &Path) -> Result<u64, GapError>;

    /// Isolated vocals of `audio_path` within `range`
    fn separate(&mut self, audio_path: &Path, range: TimeRange) -> Result<WaveformChunk, GapError>;

    /// Cooperative cancellation flag
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<B: SeparationBackend + ?Sized> SeparationBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn track_duration_ms(&mut self, audio_path: &Path) -> Result<u64, GapError> {
        (**self).track_duration_ms(audio_path)
    }

    fn separate(&mut self, audio_path: &Path, range: TimeRange) -> Result<WaveformChunk, GapError> {
        (**self).separate(audio_path, range)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
