//! Provider that separates only the ranges the scanner asks for

use super::artifacts::{artifact_dir, prepare_artifact_dir, range_vocals_path};
use super::provider::{SeparationBackend, VocalsProvider};
use crate::analysis::confidence::compute_onset_confidence;
use crate::config::{DetectionConfig, GapConfig};
use crate::error::GapError;
use crate::io::wav::{read_wav, write_wav};
use crate::io::{TimeRange, WaveformChunk};
use crate::preprocessing::silence::SilencePeriod;
use crate::scan::{ScanReport, ScanState, Scanner, SeparationSource, VocalsCache};
use std::path::{Path, PathBuf};

/// One song's vocals as seen by [`ScanningProvider`]
///
/// Nothing is separated up front; ranges are separated on demand.
#[derive(Debug, Clone)]
pub struct SongVocals {
    /// Song audio file
    pub audio_path: PathBuf,
    /// Where per-range artifacts are kept, if persisted
    pub artifact_dir: Option<PathBuf>,
    /// Track length in ms
    pub total_duration_ms: u64,
}

/// Scanner-driven provider
///
/// Silence periods are the quiet stretches before each onset the scan found.
/// The vocals cache lives for one song and is reset by `get_vocals`.
pub struct ScanningProvider<B> {
    backend: B,
    tmp_root: Option<PathBuf>,
    cache: VocalsCache,
    last_scan: Option<ScanReport>,
}

impl<B: SeparationBackend> ScanningProvider<B> {
    /// Provider that keeps separated ranges in memory only
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tmp_root: None,
            cache: VocalsCache::new(),
            last_scan: None,
        }
    }

    /// Provider persisting each separated range under `config.tmp_root`
    pub fn from_config(backend: B, config: &GapConfig) -> Self {
        Self {
            tmp_root: Some(config.tmp_root.clone()),
            ..Self::new(backend)
        }
    }

    /// Report of the most recent scan
    pub fn last_scan(&self) -> Option<&ScanReport> {
        self.last_scan.as_ref()
    }

    /// Vocals cache of the current song
    pub fn cache(&self) -> &VocalsCache {
        &self.cache
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SeparationBackend> VocalsProvider for ScanningProvider<B> {
    type Vocals = SongVocals;

    fn name(&self) -> &str {
        "scanning"
    }

    fn get_vocals(&mut self, audio_path: &Path, overwrite: bool) -> Result<SongVocals, GapError> {
        let dir = match &self.tmp_root {
            Some(root) => {
                let dir = artifact_dir(root, audio_path);
                prepare_artifact_dir(&dir, overwrite)?;
                Some(dir)
            }
            None => None,
        };

        let total_duration_ms = self.backend.track_duration_ms(audio_path)?;
        self.cache = VocalsCache::new();
        self.last_scan = None;

        log::debug!(
            "Prepared {} ({} ms) for scanning with backend {}",
            audio_path.display(),
            total_duration_ms,
            self.backend.name()
        );

        Ok(SongVocals {
            audio_path: audio_path.to_path_buf(),
            artifact_dir: dir,
            total_duration_ms,
        })
    }

    fn detect_silence_periods(
        &mut self,
        vocals: &SongVocals,
        expected_gap_ms: u64,
        config: &DetectionConfig,
    ) -> Result<Vec<SilencePeriod>, GapError> {
        let mut source = BackendSource {
            backend: &mut self.backend,
            song: vocals,
        };
        let report = Scanner::new(config).scan(expected_gap_ms, &mut source, &mut self.cache)?;
        let periods = report.silence_periods();
        self.last_scan = Some(report);
        Ok(periods)
    }

    fn was_cancelled(&self) -> bool {
        self.last_scan
            .as_ref()
            .is_some_and(|scan| scan.state == ScanState::Cancelled)
    }

    fn compute_confidence(
        &mut self,
        vocals: &SongVocals,
        candidate_ms: f64,
        config: &DetectionConfig,
    ) -> Result<f32, GapError> {
        let analysed = self
            .last_scan
            .as_ref()
            .and_then(|scan| scan.analysed.clone())
            .filter(|band| band.range().contains(candidate_ms));

        let chunk = match analysed {
            Some(band) => band,
            None => {
                let range = TimeRange::new(
                    (candidate_ms - config.noise_floor_duration_ms).max(0.0).floor() as u64,
                    ((candidate_ms + config.min_voiced_duration_ms).ceil() as u64)
                        .min(vocals.total_duration_ms),
                );
                let mut source = BackendSource {
                    backend: &mut self.backend,
                    song: vocals,
                };
                self.cache
                    .get_or_separate(range, |r| source.separate(r))?
            }
        };

        Ok(compute_onset_confidence(&chunk, candidate_ms, config))
    }
}

/// Adapts a backend plus song to the scanner's separation source
struct BackendSource<'a, B> {
    backend: &'a mut B,
    song: &'a SongVocals,
}

impl<B: SeparationBackend> SeparationSource for BackendSource<'_, B> {
    fn total_duration_ms(&self) -> u64 {
        self.song.total_duration_ms
    }

    fn separate(&mut self, range: TimeRange) -> Result<WaveformChunk, GapError> {
        let Some(dir) = &self.song.artifact_dir else {
            return self.backend.separate(&self.song.audio_path, range);
        };

        let path = range_vocals_path(dir, range);
        if path.exists() {
            log::debug!("Reusing separated vocals {}", path.display());
            return read_wav(&path, range.start_ms());
        }

        let chunk = self.backend.separate(&self.song.audio_path, range)?;
        write_wav(&path, &chunk)?;
        Ok(chunk)
    }

    fn is_cancelled(&self) -> bool {
        self.backend.is_cancelled()
    }
}
