//! On-disk layout of extracted vocals
//!
//! ```text
//! <tmp_root>/<stem>-<path hash>/vocals.wav                 whole track
//! <tmp_root>/<stem>-<path hash>/vocals_<start>_<end>.wav   one separated range
//! ```
//!
//! The path hash is the first 16 hex digits of the blake3 digest of the
//! canonical song path, so two songs sharing a file name in different
//! folders never share artifacts.

use crate::error::GapError;
use crate::io::TimeRange;
use std::path::{Path, PathBuf};

const PATH_HASH_LEN: usize = 16;

/// Artifact directory for one song
///
/// Paths that cannot be canonicalized (missing files) are hashed as given.
pub fn artifact_dir(tmp_root: &Path, audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "song".to_string());
    let canonical = audio_path
        .canonicalize()
        .unwrap_or_else(|_| audio_path.to_path_buf());
    let digest = blake3::hash(canonical.to_string_lossy().as_bytes()).to_hex();
    tmp_root.join(format!("{}-{}", stem, &digest[..PATH_HASH_LEN]))
}

/// Whole-track vocals artifact
pub fn full_vocals_path(dir: &Path) -> PathBuf {
    dir.join("vocals.wav")
}

/// Vocals artifact for one separated range
pub fn range_vocals_path(dir: &Path, range: TimeRange) -> PathBuf {
    dir.join(format!("vocals_{}_{}.wav", range.start_ms(), range.end_ms()))
}

/// Ensure `dir` exists, clearing previous artifacts when `overwrite` is set
pub fn prepare_artifact_dir(dir: &Path, overwrite: bool) -> Result<(), GapError> {
    if overwrite && dir.exists() {
        log::debug!("Clearing vocal artifacts in {}", dir.display());
        std::fs::remove_dir_all(dir).map_err(|e| GapError::io(dir, e))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| GapError::io(dir, e))
}
