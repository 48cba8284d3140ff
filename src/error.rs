//! Error types for the gap-detection engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during gap detection
///
/// Detection ambiguity (no onset, weak onset, no intro silence) is never an
/// error; it resolves to a value. Only infrastructure failures and invalid
/// configuration surface here.
#[derive(Debug, Error)]
pub enum GapError {
    /// Audio too short or malformed for analysis
    ///
    /// The onset detector recovers from this locally; it only reaches callers
    /// of the lower-level framing functions.
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Invalid configuration values, rejected before any separation work
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The vocal-separation capability failed
    #[error("Separation failed: {0}")]
    Separation(String),

    /// Filesystem error while handling vocal artifacts
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// WAV artifact could not be read or written
    #[error("WAV error at {path}: {source}")]
    Wav {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        source: hound::Error,
    },
}

impl GapError {
    /// Build an [`GapError::Io`] for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GapError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`GapError::Wav`] for `path`
    pub fn wav(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        GapError::Wav {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is fatal for the song being processed
    ///
    /// Everything except [`GapError::InvalidAudio`] is an infrastructure or
    /// configuration failure that callers record at the worker boundary.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GapError::InvalidAudio(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = GapError::Separation("model crashed".to_string());
        assert_eq!(err.to_string(), "Separation failed: model crashed");

        let err = GapError::Configuration("hop_duration_ms must be > 0".to_string());
        assert!(err.to_string().contains("hop_duration_ms"));
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = GapError::io(
            "/tmp/missing.wav",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.wav"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_invalid_audio_not_fatal() {
        assert!(!GapError::InvalidAudio("too short".to_string()).is_fatal());
    }
}
