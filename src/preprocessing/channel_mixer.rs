//! Channel mixing (multi-channel to mono)

use crate::error::GapError;

/// Average interleaved multi-channel samples into mono
///
/// A trailing partial frame is dropped.
pub fn downmix_interleaved(samples: &[f32], channels: u16) -> Result<Vec<f32>, GapError> {
    match channels {
        0 => Err(GapError::InvalidAudio(
            "Channel count must be > 0".to_string(),
        )),
        1 => Ok(samples.to_vec()),
        n => {
            let n = n as usize;
            if samples.len() % n != 0 {
                log::warn!(
                    "Dropping {} trailing samples of a partial {}-channel frame",
                    samples.len() % n,
                    n
                );
            }
            Ok(samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_interleaved() {
        assert_eq!(downmix_interleaved(&[0.2, 0.4], 1).unwrap(), vec![0.2, 0.4]);
        assert_eq!(
            downmix_interleaved(&[1.0, 0.0, 0.0, 1.0, 0.3], 2).unwrap(),
            vec![0.5, 0.5]
        );
        assert!(downmix_interleaved(&[0.0], 0).is_err());
    }
}
