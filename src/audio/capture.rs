use crate::audio::buffer::AudioRingBuffer;
use crate::audio::detector::SpeechDetector;
use crate::audio::resampler::AudioResampler;
use crate::Result;
use tracing::{debug, info};

/// Utterance capture parameters
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Rate the detector and recognizer work at
    pub sample_rate: u32,
    pub vad_threshold: f32,
    /// Audio kept from before speech onset
    pub pre_roll_ms: u32,
    /// Give up if nobody starts talking within this window
    pub initial_silence_ms: u32,
    /// Trailing silence that ends an utterance
    pub end_silence_ms: u32,
    pub max_utterance_secs: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            vad_threshold: 0.5,
            pre_roll_ms: 300,
            initial_silence_ms: 5000,
            end_silence_ms: 800,
            max_utterance_secs: 15,
        }
    }
}

impl CaptureConfig {
    fn samples_for_ms(&self, ms: u32) -> usize {
        (self.sample_rate as u64 * ms as u64 / 1000) as usize
    }

    pub fn pre_roll_samples(&self) -> usize {
        self.samples_for_ms(self.pre_roll_ms)
    }

    pub fn initial_silence_samples(&self) -> usize {
        self.samples_for_ms(self.initial_silence_ms)
    }

    pub fn end_silence_samples(&self) -> usize {
        self.samples_for_ms(self.end_silence_ms)
    }

    pub fn max_utterance_samples(&self) -> usize {
        self.sample_rate as usize * self.max_utterance_secs as usize
    }
}

/// Result of feeding audio to the segmenter
#[derive(Debug, PartialEq)]
pub enum SegmentEvent {
    /// Need more audio
    Pending,
    /// A full utterance, pre-roll included
    Complete(Vec<f32>),
    /// The initial silence window passed without speech
    NoSpeech,
}

/// Splits a 16 kHz mono stream into a single spoken utterance
pub struct UtteranceSegmenter {
    detector: Box<dyn SpeechDetector>,
    config: CaptureConfig,
    pre_roll: AudioRingBuffer,
    pending: Vec<f32>,
    utterance: Vec<f32>,
    in_speech: bool,
    silence_samples: usize,
    waited_samples: usize,
}

impl UtteranceSegmenter {
    pub fn new(detector: Box<dyn SpeechDetector>, config: CaptureConfig) -> Self {
        let pre_roll = AudioRingBuffer::new(config.pre_roll_samples());
        Self {
            detector,
            config,
            pre_roll,
            pending: Vec::new(),
            utterance: Vec::new(),
            in_speech: false,
            silence_samples: 0,
            waited_samples: 0,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Whether speech onset has been seen
    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    /// Feed resampled audio
    ///
    /// Audio left over after a terminal event is discarded; call `reset`
    /// before the next utterance.
    pub fn push(&mut self, samples: &[f32]) -> Result<SegmentEvent> {
        self.pending.extend_from_slice(samples);

        let chunk_size = self.detector.chunk_size().max(1);
        while self.pending.len() >= chunk_size {
            let chunk: Vec<f32> = self.pending.drain(..chunk_size).collect();
            match self.process_chunk(chunk)? {
                SegmentEvent::Pending => {}
                event => {
                    self.pending.clear();
                    return Ok(event);
                }
            }
        }

        Ok(SegmentEvent::Pending)
    }

    fn process_chunk(&mut self, chunk: Vec<f32>) -> Result<SegmentEvent> {
        let speech = self.detector.is_speech(&chunk)?;

        if !self.in_speech {
            if speech {
                debug!("Speech onset after {} samples", self.waited_samples);
                self.in_speech = true;
                self.silence_samples = 0;
                self.utterance = self.pre_roll.drain();
                self.utterance.extend_from_slice(&chunk);
            } else {
                self.waited_samples += chunk.len();
                self.pre_roll.write(&chunk);
                if self.waited_samples >= self.config.initial_silence_samples() {
                    info!("No speech detected");
                    return Ok(SegmentEvent::NoSpeech);
                }
            }
            return Ok(SegmentEvent::Pending);
        }

        self.utterance.extend_from_slice(&chunk);
        if speech {
            self.silence_samples = 0;
        } else {
            self.silence_samples += chunk.len();
        }

        if self.silence_samples >= self.config.end_silence_samples() {
            debug!("Utterance ended by silence");
            return Ok(SegmentEvent::Complete(std::mem::take(&mut self.utterance)));
        }
        if self.utterance.len() >= self.config.max_utterance_samples() {
            info!("Utterance hit the {} s limit", self.config.max_utterance_secs);
            return Ok(SegmentEvent::Complete(std::mem::take(&mut self.utterance)));
        }

        Ok(SegmentEvent::Pending)
    }

    /// Close the stream early, returning whatever speech was collected
    pub fn finish(&mut self) -> Option<Vec<f32>> {
        if !self.in_speech {
            return None;
        }
        let mut utterance = std::mem::take(&mut self.utterance);
        utterance.append(&mut self.pending);
        Some(utterance)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.pre_roll.clear();
        self.pending.clear();
        self.utterance.clear();
        self.in_speech = false;
        self.silence_samples = 0;
        self.waited_samples = 0;
        self.detector.reset()
    }
}

/// End capture early: push whatever the resampler still holds, then close
/// the segmenter
pub fn close_capture(
    resampler: &mut AudioResampler,
    segmenter: &mut UtteranceSegmenter,
) -> Result<Option<Vec<f32>>> {
    let tail = resampler.flush()?;
    match segmenter.push(&tail)? {
        SegmentEvent::Complete(samples) => Ok(Some(samples)),
        SegmentEvent::NoSpeech => Ok(None),
        SegmentEvent::Pending => Ok(segmenter.finish()),
    }
}

#[cfg(feature = "audio-io")]
pub use device::record_utterance;

#[cfg(feature = "audio-io")]
mod device {
    use super::{close_capture, SegmentEvent, UtteranceSegmenter};
    use crate::audio::input::AudioInput;
    use crate::audio::resampler::AudioResampler;
    use crate::{ClerkError, Result};
    use crossbeam_channel::{bounded, RecvTimeoutError};
    use std::time::{Duration, Instant};
    use tracing::warn;

    /// Record one utterance from the microphone
    ///
    /// Returns `None` when nobody spoke within the initial silence window.
    pub fn record_utterance(
        input: &mut AudioInput,
        segmenter: &mut UtteranceSegmenter,
    ) -> Result<Option<Vec<f32>>> {
        let config = segmenter.config().clone();
        let mut resampler = AudioResampler::new(input.sample_rate(), config.sample_rate)?;
        segmenter.reset()?;

        let (tx, rx) = bounded::<Vec<f32>>(256);
        input.start_recording(tx)?;

        // A stalled device must not hang the session
        let budget = Duration::from_millis(config.initial_silence_ms as u64)
            + Duration::from_secs(config.max_utterance_secs as u64 + 1);
        let deadline = Instant::now() + budget;

        let outcome = loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(block) => {
                    let resampled = match resampler.process(&block) {
                        Ok(samples) => samples,
                        Err(e) => break Err(e),
                    };
                    match segmenter.push(&resampled) {
                        Ok(SegmentEvent::Pending) => {}
                        Ok(SegmentEvent::Complete(samples)) => break Ok(Some(samples)),
                        Ok(SegmentEvent::NoSpeech) => break Ok(None),
                        Err(e) => break Err(e),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    break Err(ClerkError::ChannelError("Audio input channel closed".into()))
                }
            }

            if Instant::now() >= deadline {
                warn!("Capture deadline reached");
                break close_capture(&mut resampler, segmenter);
            }
        };

        input.stop_recording()?;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::detector::EnergyDetector;

    const SPEECH: f32 = 0.3;

    fn segmenter() -> UtteranceSegmenter {
        UtteranceSegmenter::new(Box::new(EnergyDetector::default()), CaptureConfig::default())
    }

    fn feed(segmenter: &mut UtteranceSegmenter, value: f32, samples: usize) -> SegmentEvent {
        // 160-sample blocks, like a 10 ms device callback
        let block = vec![value; 160];
        let mut fed = 0;
        while fed < samples {
            let n = (samples - fed).min(block.len());
            match segmenter.push(&block[..n]).unwrap() {
                SegmentEvent::Pending => {}
                event => return event,
            }
            fed += n;
        }
        SegmentEvent::Pending
    }

    #[test]
    fn test_default_durations() {
        let config = CaptureConfig::default();
        assert_eq!(config.pre_roll_samples(), 4800);
        assert_eq!(config.initial_silence_samples(), 80000);
        assert_eq!(config.end_silence_samples(), 12800);
        assert_eq!(config.max_utterance_samples(), 240000);
    }

    #[test]
    fn test_no_speech_after_initial_silence() {
        let mut segmenter = segmenter();
        assert_eq!(feed(&mut segmenter, 0.0, 79_000), SegmentEvent::Pending);
        assert_eq!(feed(&mut segmenter, 0.0, 2_000), SegmentEvent::NoSpeech);
        assert!(segmenter.finish().is_none());
    }

    #[test]
    fn test_utterance_ends_on_silence() {
        let mut segmenter = segmenter();
        assert_eq!(feed(&mut segmenter, 0.0, 8_192), SegmentEvent::Pending);
        assert_eq!(feed(&mut segmenter, SPEECH, 16_384), SegmentEvent::Pending);
        assert!(segmenter.in_speech());

        let SegmentEvent::Complete(samples) = feed(&mut segmenter, 0.0, 20_000) else {
            panic!("expected a complete utterance");
        };

        // pre-roll + speech + trailing silence
        assert_eq!(samples.len(), 4800 + 16_384 + 12_800);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[4800], SPEECH);
    }

    #[test]
    fn test_short_pause_does_not_end_utterance() {
        let mut segmenter = segmenter();
        feed(&mut segmenter, SPEECH, 8_192);
        assert_eq!(feed(&mut segmenter, 0.0, 4_096), SegmentEvent::Pending);
        assert_eq!(feed(&mut segmenter, SPEECH, 8_192), SegmentEvent::Pending);
        assert!(matches!(feed(&mut segmenter, 0.0, 20_000), SegmentEvent::Complete(_)));
    }

    #[test]
    fn test_max_length_cuts_utterance() {
        let mut segmenter = segmenter();
        let SegmentEvent::Complete(samples) = feed(&mut segmenter, SPEECH, 300_000) else {
            panic!("expected a complete utterance");
        };
        assert_eq!(samples.len(), 240_128);
    }

    #[test]
    fn test_finish_returns_partial_speech() {
        let mut segmenter = segmenter();
        feed(&mut segmenter, SPEECH, 1_100);
        let samples = segmenter.finish().unwrap();
        assert_eq!(samples.len(), 1_100);
    }

    #[test]
    fn test_close_capture_keeps_resampler_tail() {
        let mut segmenter = segmenter();
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();

        // 3000 input frames: the first 1024-frame chunks come out, the rest stays buffered
        let out = resampler.process(&[SPEECH; 3000]).unwrap();
        assert_eq!(segmenter.push(&out).unwrap(), SegmentEvent::Pending);
        assert!(segmenter.in_speech());

        let samples = close_capture(&mut resampler, &mut segmenter).unwrap().unwrap();
        // 3000 frames at 48 kHz -> about 1000 at 16 kHz, nothing dropped
        assert!(samples.len() > out.len(), "{} <= {}", samples.len(), out.len());
        assert!((980..=1020).contains(&samples.len()), "got {}", samples.len());
    }

    #[test]
    fn test_close_capture_without_speech() {
        let mut segmenter = segmenter();
        let mut resampler = AudioResampler::new(16000, 16000).unwrap();
        segmenter.push(&[0.0; 1024]).unwrap();
        assert!(close_capture(&mut resampler, &mut segmenter).unwrap().is_none());
    }

    #[test]
    fn test_reset() {
        let mut segmenter = segmenter();
        feed(&mut segmenter, SPEECH, 2_048);
        segmenter.reset().unwrap();
        assert!(!segmenter.in_speech());
        assert!(segmenter.finish().is_none());
    }
}
