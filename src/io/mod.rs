//! Audio I/O modules
//!
//! Immutable waveform chunks and WAV vocal artifacts.

pub mod chunk;
pub mod wav;

pub use chunk::{TimeRange, WaveformChunk};
