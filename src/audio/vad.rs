use crate::audio::detector::{SpeechDetector, CHUNK_SAMPLES_16K};
use crate::{ClerkError, Result};
use tracing::info;
use voice_activity_detector::VoiceActivityDetector as VadDetector;

/// Voice Activity Detection using Silero VAD at 16 kHz
pub struct VoiceActivityDetector {
    detector: VadDetector,
    threshold: f32,
}

impl VoiceActivityDetector {
    /// Create a new VAD instance
    ///
    /// # Arguments
    /// * `threshold` - Probability threshold for speech detection (0.0-1.0)
    pub fn new(threshold: f32) -> Result<Self> {
        let detector = VadDetector::builder()
            .sample_rate(16000)
            .chunk_size(CHUNK_SAMPLES_16K)
            .build()
            .map_err(|e| ClerkError::AudioProcessingError(format!("Failed to create VAD: {:?}", e)))?;

        info!("Initialized VAD with threshold: {}", threshold);

        Ok(Self {
            detector,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    /// Get the speech probability for the audio chunk
    pub fn probability(&mut self, audio: &[f32]) -> f32 {
        self.detector.predict(audio.iter().copied())
    }

    /// Get the current threshold
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl SpeechDetector for VoiceActivityDetector {
    fn chunk_size(&self) -> usize {
        CHUNK_SAMPLES_16K
    }

    fn is_speech(&mut self, chunk: &[f32]) -> Result<bool> {
        Ok(self.probability(chunk) >= self.threshold)
    }

    fn reset(&mut self) -> Result<()> {
        self.detector.reset();
        Ok(())
    }
}
