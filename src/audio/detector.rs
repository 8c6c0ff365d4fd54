use crate::Result;

/// Chunk length in samples at 16 kHz (32 ms)
pub const CHUNK_SAMPLES_16K: usize = 512;

/// Classifies fixed-size chunks of 16 kHz mono audio as speech or not
pub trait SpeechDetector {
    /// Samples per chunk this detector expects
    fn chunk_size(&self) -> usize;

    fn is_speech(&mut self, chunk: &[f32]) -> Result<bool>;

    /// Forget any state carried between chunks
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

/// RMS-threshold detector
///
/// Fallback when the neural VAD is unavailable. Works in quiet rooms; noisy
/// ones need a higher threshold.
#[derive(Clone, Debug)]
pub struct EnergyDetector {
    threshold: f32,
    chunk_size: usize,
}

impl EnergyDetector {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            chunk_size: CHUNK_SAMPLES_16K,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for EnergyDetector {
    fn default() -> Self {
        Self::new(0.02)
    }
}

impl SpeechDetector for EnergyDetector {
    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn is_speech(&mut self, chunk: &[f32]) -> Result<bool> {
        Ok(rms(chunk) >= self.threshold)
    }
}

/// Root-mean-square level of a block of samples
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.0; 16]), 0.0);
        assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_energy_detector() {
        let mut detector = EnergyDetector::default();
        assert_eq!(detector.chunk_size(), 512);
        assert!(!detector.is_speech(&[0.0; 512]).unwrap());
        assert!(!detector.is_speech(&[0.005; 512]).unwrap());
        assert!(detector.is_speech(&[0.3; 512]).unwrap());
    }
}
