//! WAV reading and writing for vocal artifacts

use super::chunk::{TimeRange, WaveformChunk};
use crate::error::GapError;
use crate::preprocessing::channel_mixer::downmix_interleaved;
use std::path::Path;

/// Read a WAV file as mono f32 samples
///
/// Integer formats are scaled to [-1.0, 1.0]; multi-channel files are
/// downmixed by averaging.
///
/// # Returns
///
/// Tuple of (samples, sample_rate)
pub fn read_wav_samples(path: &Path) -> Result<(Vec<f32>, u32), GapError> {
    let mut reader = hound::WavReader::open(path).map_err(|e| GapError::wav(path, e))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GapError::wav(path, e))?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| GapError::wav(path, e))?
        }
    };

    let mono = downmix_interleaved(&samples, spec.channels)?;

    log::debug!(
        "Read {} mono samples at {} Hz from {}",
        mono.len(),
        spec.sample_rate,
        path.display()
    );

    Ok((mono, spec.sample_rate))
}

/// Read a WAV file as a chunk starting at `start_ms`
///
/// The chunk's end is derived from the sample count.
pub fn read_wav(path: &Path, start_ms: u64) -> Result<WaveformChunk, GapError> {
    let (samples, sample_rate) = read_wav_samples(path)?;
    if sample_rate == 0 {
        return Err(GapError::InvalidAudio(format!(
            "{} declares a sample rate of 0 Hz",
            path.display()
        )));
    }
    let duration_ms = (samples.len() as f64 * 1000.0 / sample_rate as f64).round() as u64;
    Ok(WaveformChunk::new(
        TimeRange::new(start_ms, start_ms + duration_ms),
        sample_rate,
        samples,
    ))
}

/// Write a chunk as a mono 32-bit float WAV file
pub fn write_wav(path: &Path, chunk: &WaveformChunk) -> Result<(), GapError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: chunk.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| GapError::wav(path, e))?;
    for &sample in chunk.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| GapError::wav(path, e))?;
    }
    writer.finalize().map_err(|e| GapError::wav(path, e))?;

    log::debug!(
        "Wrote {} samples ({}) to {}",
        chunk.len(),
        chunk.range(),
        path.display()
    );

    Ok(())
}
