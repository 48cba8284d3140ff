//! Feature extraction modules
//!
//! This module contains the signal-level algorithms:
//! - Onset detection (RMS energy, noise floor, sustained onsets)

pub mod onset;
