//! Audio preprocessing modules
//!
//! This module contains utilities for preparing vocals for analysis:
//! - Channel mixing (multi-channel to mono)
//! - Silence-period detection

pub mod channel_mixer;
pub mod silence;
