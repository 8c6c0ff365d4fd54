pub mod buffer;
pub mod capture;
pub mod detector;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod resampler;
#[cfg(feature = "audio-io")]
pub mod vad;
pub mod wav;

pub use buffer::AudioRingBuffer;
#[cfg(feature = "audio-io")]
pub use capture::record_utterance;
pub use capture::{close_capture, CaptureConfig, SegmentEvent, UtteranceSegmenter};
pub use detector::{EnergyDetector, SpeechDetector};
#[cfg(feature = "audio-io")]
pub use input::AudioInput;
#[cfg(feature = "audio-io")]
pub use output::AudioOutput;
pub use resampler::AudioResampler;
#[cfg(feature = "audio-io")]
pub use vad::VoiceActivityDetector;
pub use wav::{encode_wav, wav_info, WavInfo};
