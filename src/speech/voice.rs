//! Microphone and speaker backed speech

use crate::audio::{
    encode_wav, record_utterance, wav_info, AudioInput, AudioOutput, CaptureConfig, EnergyDetector,
    SpeechDetector, UtteranceSegmenter, VoiceActivityDetector,
};
use crate::speech::config::SpeechServiceConfig;
use crate::speech::stt::AzureRecognizer;
use crate::speech::tts::AzureSynthesizer;
use crate::speech::SpeechInterface;
use crate::Result;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

/// Voice I/O: record an utterance, recognize it, synthesize replies and play them
pub struct VoiceSpeech {
    input: AudioInput,
    output: AudioOutput,
    segmenter: UtteranceSegmenter,
    recognizer: AzureRecognizer,
    synthesizer: AzureSynthesizer,
    sample_rate: u32,
}

impl VoiceSpeech {
    pub fn new(config: &SpeechServiceConfig, capture: CaptureConfig, runtime: Arc<Runtime>) -> Result<Self> {
        let input = AudioInput::new()?;
        let output = AudioOutput::new()?;

        let detector: Box<dyn SpeechDetector> = match VoiceActivityDetector::new(capture.vad_threshold) {
            Ok(vad) => Box::new(vad),
            Err(e) => {
                warn!("Silero VAD unavailable ({}), falling back to energy detection", e);
                Box::new(EnergyDetector::default())
            }
        };

        let sample_rate = capture.sample_rate;
        info!(
            "Voice I/O ready: {} Hz x{} capture, voice {}",
            input.sample_rate(),
            input.channels(),
            config.voice
        );

        Ok(Self {
            input,
            output,
            segmenter: UtteranceSegmenter::new(detector, capture),
            recognizer: AzureRecognizer::new(config, Arc::clone(&runtime)),
            synthesizer: AzureSynthesizer::new(config, runtime),
            sample_rate,
        })
    }
}

impl SpeechInterface for VoiceSpeech {
    fn listen(&mut self) -> Result<String> {
        info!("Listening...");
        let Some(samples) = record_utterance(&mut self.input, &mut self.segmenter)? else {
            return Ok(String::new());
        };

        debug!(
            "Captured {:.2}s of speech",
            samples.len() as f32 / self.sample_rate as f32
        );

        let wav = encode_wav(&samples, self.sample_rate)?;
        let result = self.recognizer.recognize(wav)?;
        debug!("Recognition status: {:?}", result.status);
        Ok(result.text)
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        let Some(audio) = self.synthesizer.synthesize(text)? else {
            return Ok(());
        };

        if let Ok(info) = wav_info(&audio) {
            debug!(
                "Playing {:.2}s of synthesized speech at {} Hz",
                info.duration_secs, info.sample_rate
            );
        }

        self.output.play_wav(audio)
    }

    fn stop_listening(&mut self) -> Result<()> {
        if self.input.is_recording() {
            self.input.stop_recording()?;
        }
        Ok(())
    }
}
