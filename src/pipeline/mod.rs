//! Gap detection pipeline
//!
//! Per song:
//! 1. Validate configuration
//! 2. Extract (or reuse) vocals through the provider
//! 3. Find silence periods near the stored gap
//! 4. Pick the silence endpoint closest to the stored gap
//! 5. Score the pick and compare it with the stored gap
//!
//! Songs are independent. [`perform_batch`] runs them in parallel, one
//! provider per song.

pub mod artifacts;
pub mod provider;
pub mod scanning;
pub mod silence_detect;
pub mod stem;

pub use provider::{SeparationBackend, VocalsProvider};
pub use scanning::{ScanningProvider, SongVocals};
pub use silence_detect::SilenceDetectProvider;
pub use stem::StemFileBackend;

use crate::analysis::candidate::select_gap_candidate;
use crate::analysis::metadata::GapMetadata;
use crate::analysis::result::{GapResult, GapStatus};
use crate::config::GapConfig;
use crate::error::GapError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Detect the vocal gap of one song
///
/// # Arguments
///
/// * `audio_path` - Song audio file, handed to the provider
/// * `expected_gap_ms` - Gap stored in the song metadata (0 if unknown)
/// * `config` - Gap detection configuration
/// * `provider` - Vocals provider
///
/// # Returns
///
/// `GapResult` with the detected gap, confidence and match status. A song
/// without any silence period reports a gap of 0 with confidence 0. A
/// cancelled detection reports status `Cancelled`, never `Match`.
///
/// # Errors
///
/// `GapError::Configuration` before any provider call if `config` is
/// invalid; provider errors propagate unchanged.
///
/// # Example
///
/// ```no_run
/// use vocal_gap::{perform, GapConfig, ScanningProvider, StemFileBackend};
/// use std::path::Path;
///
/// let config = GapConfig::default();
/// let mut provider = ScanningProvider::from_config(StemFileBackend::new(), &config);
/// let result = perform(Path::new("vocals.wav"), 12_000, &config, &mut provider)?;
///
/// println!("Gap: {:.0} ms ({})", result.detected_gap_ms, result.confidence_level());
/// # Ok::<(), vocal_gap::GapError>(())
/// ```
pub fn perform<P>(
    audio_path: &Path,
    expected_gap_ms: u64,
    config: &GapConfig,
    provider: &mut P,
) -> Result<GapResult, GapError>
where
    P: VocalsProvider + ?Sized,
{
    let start_time = Instant::now();
    config.validate()?;
    let detection = config.detection_for(expected_gap_ms);

    log::info!(
        "Detecting gap of {} (stored {} ms) with provider {}",
        audio_path.display(),
        expected_gap_ms,
        provider.name()
    );

    let vocals = provider.get_vocals(audio_path, config.overwrite)?;
    let silence_periods = provider.detect_silence_periods(&vocals, expected_gap_ms, &detection)?;

    let (detected_gap_ms, confidence, status) = if provider.was_cancelled() {
        log::info!("Gap detection of {} cancelled", audio_path.display());
        (0.0, 0.0, GapStatus::Cancelled)
    } else {
        let (detected_gap_ms, confidence) =
            match select_gap_candidate(&silence_periods, expected_gap_ms as f64) {
                Some(candidate) => (
                    candidate,
                    provider.compute_confidence(&vocals, candidate, &detection)?,
                ),
                None => {
                    log::warn!(
                        "No silence periods in {}, reporting a gap of 0",
                        audio_path.display()
                    );
                    (0.0, 0.0)
                }
            };
        let status =
            GapStatus::classify(detected_gap_ms, expected_gap_ms, detection.gap_tolerance_ms);
        (detected_gap_ms, confidence, status)
    };
    let processing_time_ms = start_time.elapsed().as_secs_f64() as f32 * 1000.0;

    log::info!(
        "Gap of {}: {:.0} ms (stored {} ms, {:?}), confidence {:.2}, {:.1} ms",
        audio_path.display(),
        detected_gap_ms,
        expected_gap_ms,
        status,
        confidence,
        processing_time_ms
    );

    Ok(GapResult {
        detected_gap_ms,
        expected_gap_ms,
        confidence,
        method_name: config.method.clone(),
        status,
        silence_periods,
        metadata: GapMetadata::for_provider(provider.name(), processing_time_ms),
    })
}

/// One song to process in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapJob {
    /// Song audio file
    pub audio_path: PathBuf,
    /// Gap stored in the song metadata (0 if unknown)
    pub expected_gap_ms: u64,
}

impl GapJob {
    /// Job for `audio_path` with stored gap `expected_gap_ms`
    pub fn new(audio_path: impl Into<PathBuf>, expected_gap_ms: u64) -> Self {
        Self {
            audio_path: audio_path.into(),
            expected_gap_ms,
        }
    }
}

/// Detect the gaps of many songs in parallel
///
/// Each job gets its own provider from `make_provider`, so no state is
/// shared between songs. Results are in job order; one song failing does
/// not affect the others.
pub fn perform_batch<P, F>(
    jobs: &[GapJob],
    config: &GapConfig,
    make_provider: F,
) -> Vec<Result<GapResult, GapError>>
where
    P: VocalsProvider,
    F: Fn() -> P + Sync,
{
    log::debug!("Processing {} songs on {} threads", jobs.len(), rayon::current_num_threads());

    jobs.par_iter()
        .map(|job| {
            let mut provider = make_provider();
            perform(&job.audio_path, job.expected_gap_ms, config, &mut provider)
        })
        .collect()
}
