//! # Vocal Gap
//!
//! A vocal gap detection engine for karaoke song files. It finds where the
//! singing begins so that stored timing metadata (the "gap") can be checked
//! or corrected.
//!
//! ## Features
//!
//! - **Onset Detection**: RMS energy against an adaptive noise floor, with
//!   sustained-run gating and leading-edge refinement
//! - **Distance-Gated Scan**: search windows centered on the stored gap,
//!   expanded step by step until an onset lands within tolerance
//! - **Lazy Separation**: only the ranges a scan needs are separated, each
//!   at most once per song
//! - **Pluggable Providers**: scanner-driven or full-track silence detection
//!   over any separation backend
//!
//! ## Quick Start
//!
//! ```no_run
//! use vocal_gap::{perform, GapConfig, ScanningProvider, StemFileBackend};
//! use std::path::Path;
//!
//! let config = GapConfig::default();
//! let mut provider = ScanningProvider::from_config(StemFileBackend::new(), &config);
//!
//! let result = perform(Path::new("song_vocals.wav"), 12_000, &config, &mut provider)?;
//!
//! println!("Gap: {:.0} ms (confidence: {:.2})", result.detected_gap_ms, result.confidence);
//! println!("Stored gap {:?}: off by {:.0} ms", result.status, result.difference_ms());
//! # Ok::<(), vocal_gap::GapError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Song → Provider (vocals) → Silence periods / Scan → Candidate selection → Confidence → GapResult
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod pipeline;
pub mod preprocessing;
pub mod scan;

// Re-export main types
pub use analysis::result::{GapResult, GapStatus};
pub use config::{DetectionConfig, GapConfig};
pub use error::GapError;
pub use features::onset::detector::{detect_onset, detect_onsets};
pub use features::onset::OnsetCandidate;
pub use io::{TimeRange, WaveformChunk};
pub use pipeline::{
    perform, perform_batch, GapJob, ScanningProvider, SeparationBackend, SilenceDetectProvider,
    StemFileBackend, VocalsProvider,
};
pub use preprocessing::silence::SilencePeriod;
pub use scan::{InMemoryVocals, ScanReport, ScanState, Scanner, SeparationSource, VocalsCache};
