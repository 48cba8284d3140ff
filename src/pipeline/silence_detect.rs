//! Provider that separates the whole track and detects silence over it

use super::artifacts::{artifact_dir, full_vocals_path, prepare_artifact_dir};
use super::provider::{SeparationBackend, VocalsProvider};
use crate::analysis::confidence::compute_onset_confidence;
use crate::config::{DetectionConfig, GapConfig};
use crate::error::GapError;
use crate::io::wav::{read_wav, write_wav};
use crate::io::{TimeRange, WaveformChunk};
use crate::preprocessing::silence::{detect_silence_periods, SilenceDetector, SilencePeriod};
use std::path::{Path, PathBuf};

/// Full-track silence detection provider
///
/// The whole vocal track is separated once and kept as
/// `vocals.wav` in the song's artifact directory. Periods starting after
/// `expected + search_limit_ms` are dropped.
pub struct SilenceDetectProvider<B> {
    backend: B,
    tmp_root: PathBuf,
    detector: SilenceDetector,
}

impl<B: SeparationBackend> SilenceDetectProvider<B> {
    /// Provider writing artifacts under `tmp_root`
    pub fn new(backend: B, tmp_root: impl Into<PathBuf>, detector: SilenceDetector) -> Self {
        Self {
            backend,
            tmp_root: tmp_root.into(),
            detector,
        }
    }

    /// Provider using the artifact root and silence settings of `config`
    pub fn from_config(backend: B, config: &GapConfig) -> Self {
        Self::new(backend, config.tmp_root.clone(), config.silence.clone())
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SeparationBackend> VocalsProvider for SilenceDetectProvider<B> {
    type Vocals = WaveformChunk;

    fn name(&self) -> &str {
        "silence"
    }

    fn get_vocals(&mut self, audio_path: &Path, overwrite: bool) -> Result<WaveformChunk, GapError> {
        let dir = artifact_dir(&self.tmp_root, audio_path);
        prepare_artifact_dir(&dir, overwrite)?;
        let path = full_vocals_path(&dir);

        if path.exists() {
            log::info!("Reusing extracted vocals {}", path.display());
            return read_wav(&path, 0);
        }

        let total_ms = self.backend.track_duration_ms(audio_path)?;
        log::info!(
            "Separating vocals of {} ({} ms) with backend {}",
            audio_path.display(),
            total_ms,
            self.backend.name()
        );
        let vocals = self
            .backend
            .separate(audio_path, TimeRange::new(0, total_ms))?;
        write_wav(&path, &vocals)?;

        Ok(vocals)
    }

    fn detect_silence_periods(
        &mut self,
        vocals: &WaveformChunk,
        expected_gap_ms: u64,
        config: &DetectionConfig,
    ) -> Result<Vec<SilencePeriod>, GapError> {
        let limit_ms = expected_gap_ms as f64 + config.search_limit_ms;
        let periods: Vec<SilencePeriod> = detect_silence_periods(vocals, &self.detector)?
            .into_iter()
            .filter(|p| p.start_ms < limit_ms)
            .collect();

        log::debug!(
            "{} silence periods start before {:.0} ms",
            periods.len(),
            limit_ms
        );

        Ok(periods)
    }

    fn compute_confidence(
        &mut self,
        vocals: &WaveformChunk,
        candidate_ms: f64,
        config: &DetectionConfig,
    ) -> Result<f32, GapError> {
        Ok(compute_onset_confidence(vocals, candidate_ms, config))
    }
}
