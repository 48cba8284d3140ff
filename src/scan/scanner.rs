//! Distance-gated vocal onset scan
//!
//! State machine per scan:
//!
//! ```text
//! Init -> Analyzing -> Found       (candidate within gap tolerance)
//!                   -> Expanding -> Analyzing ...
//!                   -> Exhausted   (no wider window possible)
//!                   -> Cancelled   (cancellation observed before a request)
//! ```
//!
//! Each iteration separates only the parts of the window not yet covered,
//! joins the pieces into one band and runs onset detection over the whole
//! band. Every onset found is kept as a candidate. The reported onset is the
//! candidate closest to the expected gap, not the earliest one.

use super::cache::VocalsCache;
use super::chunk_iterator::ChunkIterator;
use super::source::SeparationSource;
use super::window::{ExpansionStrategy, SearchWindow};
use crate::config::DetectionConfig;
use crate::error::GapError;
use crate::features::onset::detector::detect_onsets;
use crate::features::onset::OnsetCandidate;
use crate::io::WaveformChunk;
use crate::preprocessing::silence::SilencePeriod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Scan progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    /// Nothing requested yet
    Init,
    /// Separating and detecting over the current window
    Analyzing,
    /// Widening the window after an unsatisfying pass
    Expanding,
    /// A candidate was selected
    Found,
    /// Expansion exhausted without any candidate
    Exhausted,
    /// Cancellation observed
    Cancelled,
}

/// Outcome of one scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Candidate closest to the expected gap
    pub best: Option<OnsetCandidate>,

    /// Every candidate collected, in time order
    pub candidates: Vec<OnsetCandidate>,

    /// Terminal state
    pub state: ScanState,

    /// Last window analysed
    pub final_window: Option<SearchWindow>,

    /// Number of analysis passes
    pub iterations: usize,

    /// Vocals of the last analysed band
    pub analysed: Option<Arc<WaveformChunk>>,
}

impl ScanReport {
    fn new() -> Self {
        Self {
            best: None,
            candidates: Vec::new(),
            state: ScanState::Init,
            final_window: None,
            iterations: 0,
            analysed: None,
        }
    }

    /// Selected onset time in ms
    pub fn onset_ms(&self) -> Option<f64> {
        self.best.map(|c| c.timestamp_ms)
    }

    /// Quiet stretch before each candidate, in time order
    ///
    /// Each period ends at its candidate's onset. Empty when nothing was
    /// selected, including after cancellation.
    pub fn silence_periods(&self) -> Vec<SilencePeriod> {
        if self.best.is_none() {
            return Vec::new();
        }
        self.candidates
            .iter()
            .map(|c| SilencePeriod::new(c.quiet_since_ms, c.timestamp_ms))
            .collect()
    }
}

/// Runs scans with one detection configuration
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    config: &'a DetectionConfig,
}

impl<'a> Scanner<'a> {
    /// Scanner over `config`
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self { config }
    }

    /// Find the vocal onset nearest to `expected_gap_ms`
    ///
    /// # Errors
    ///
    /// `GapError::Configuration` if the configuration is invalid (checked
    /// before any separation), and any error raised by `source` or by joining
    /// its pieces. No onset is a successful report with `best == None`.
    pub fn scan<S>(
        &self,
        expected_gap_ms: u64,
        source: &mut S,
        cache: &mut VocalsCache,
    ) -> Result<ScanReport, GapError>
    where
        S: SeparationSource + ?Sized,
    {
        self.config.validate()?;

        let mut report = ScanReport::new();
        let total_ms = source.total_duration_ms();
        if total_ms == 0 {
            log::warn!("Track has zero duration, nothing to scan");
            report.state = ScanState::Exhausted;
            return Ok(report);
        }

        let strategy = ExpansionStrategy::new(self.config, expected_gap_ms, total_ms);
        let mut iterator = ChunkIterator::new();
        let mut pieces: BTreeMap<u64, Arc<WaveformChunk>> = BTreeMap::new();
        let mut candidates: Vec<OnsetCandidate> = Vec::new();
        let mut best: Option<OnsetCandidate>;
        let mut window = strategy.initial();
        let expected = expected_gap_ms as f64;
        // Refinement moves an onset by at most the hysteresis, plus one hop
        // of frame alignment between differently anchored bands
        let same_onset_ms = self.config.hop_duration_ms + self.config.hysteresis_ms;

        log::debug!(
            "Scanning for onset near {} ms in a {} ms track",
            expected_gap_ms,
            total_ms
        );

        loop {
            report.state = ScanState::Analyzing;

            for range in iterator.next_ranges(&window) {
                if source.is_cancelled() {
                    log::info!("Scan cancelled before separating {}", range);
                    report.state = ScanState::Cancelled;
                    report.best = None;
                    report.candidates = candidates;
                    return Ok(report);
                }
                let piece = cache.get_or_separate(range, |r| source.separate(r))?;
                pieces.insert(range.start_ms(), piece);
            }

            let ordered: Vec<Arc<WaveformChunk>> = pieces.values().cloned().collect();
            if !ordered.is_empty() {
                let band = Arc::new(WaveformChunk::concat(&ordered)?);
                for event in detect_onsets(&band, self.config) {
                    let candidate = OnsetCandidate::from_event(&event, band.range());
                    merge_candidate(&mut candidates, candidate, same_onset_ms);
                }
                report.analysed = Some(band);
            }
            report.final_window = Some(window);
            report.iterations += 1;

            best = candidates
                .iter()
                .min_by(|a, b| a.distance_to(expected).total_cmp(&b.distance_to(expected)))
                .copied();

            log::debug!(
                "Iteration {} over {}: {} candidates, best {:?}",
                window.iteration_index,
                window.range(),
                candidates.len(),
                best.map(|c| c.timestamp_ms)
            );

            if let Some(candidate) = best {
                if candidate.distance_to(expected) <= self.config.gap_tolerance_ms {
                    report.state = ScanState::Found;
                    break;
                }
            }

            match strategy.expand(&window) {
                Some(next) => {
                    report.state = ScanState::Expanding;
                    window = next;
                }
                None => {
                    report.state = if best.is_some() {
                        ScanState::Found
                    } else {
                        ScanState::Exhausted
                    };
                    break;
                }
            }
        }

        candidates.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));
        report.best = best;
        report.candidates = candidates;

        match report.best {
            Some(candidate) => log::info!(
                "Onset at {:.1} ms (expected {} ms, off by {:.1} ms) after {} iterations",
                candidate.timestamp_ms,
                expected_gap_ms,
                candidate.distance_to(expected),
                report.iterations
            ),
            None => log::info!(
                "No vocal onset near {} ms after {} iterations",
                expected_gap_ms,
                report.iterations
            ),
        }

        Ok(report)
    }

    /// Selected onset time only
    pub fn find_onset<S>(
        &self,
        expected_gap_ms: u64,
        source: &mut S,
        cache: &mut VocalsCache,
    ) -> Result<Option<f64>, GapError>
    where
        S: SeparationSource + ?Sized,
    {
        Ok(self.scan(expected_gap_ms, source, cache)?.onset_ms())
    }
}

/// Add `candidate`, replacing an earlier detection of the same onset
///
/// A wider band re-detects onsets already seen, possibly shifted because the
/// band's noise floor changed. The newer detection has more leading context,
/// so it replaces the nearest earlier one within `same_within_ms`.
fn merge_candidate(candidates: &mut Vec<OnsetCandidate>, candidate: OnsetCandidate, same_within_ms: f64) {
    let nearest = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| (i, (c.timestamp_ms - candidate.timestamp_ms).abs()))
        .filter(|&(_, distance)| distance <= same_within_ms)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i);

    match nearest {
        Some(i) => candidates[i] = candidate,
        None => candidates.push(candidate),
    }
}
