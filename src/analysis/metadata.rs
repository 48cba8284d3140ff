//! Gap detection metadata

use serde::{Deserialize, Serialize};

/// How a result was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapMetadata {
    /// Algorithm version
    pub algorithm_version: String,

    /// Name of the vocals provider
    pub provider: String,

    /// Wall-clock time of the whole detection in milliseconds
    pub processing_time_ms: f32,
}

impl Default for GapMetadata {
    fn default() -> Self {
        Self {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            provider: String::new(),
            processing_time_ms: 0.0,
        }
    }
}

impl GapMetadata {
    /// Metadata for a run through `provider`
    pub fn for_provider(provider: impl Into<String>, processing_time_ms: f32) -> Self {
        Self {
            provider: provider.into(),
            processing_time_ms,
            ..Self::default()
        }
    }
}
