//! Speech input and output
//!
//! This module provides:
//! - The `SpeechInterface` seam used by the dispatch loop
//! - A console implementation (stdin/stdout)
//! - Speech-to-text and text-to-speech clients for the hosted speech service
//! - A voice implementation wiring microphone, recognition, synthesis and playback

pub mod config;
pub mod console;
pub mod stt;
pub mod tts;
#[cfg(feature = "audio-io")]
pub mod voice;

use crate::Result;

pub use config::SpeechServiceConfig;
pub use console::ConsoleSpeech;
pub use stt::{AzureRecognizer, RecognitionResult, RecognitionStatus};
pub use tts::{build_ssml, prepare_for_speech, AzureSynthesizer};
#[cfg(feature = "audio-io")]
pub use voice::VoiceSpeech;

/// Listening and speaking, both blocking
pub trait SpeechInterface {
    /// One recognition attempt. Returns an empty string when nothing was recognized.
    fn listen(&mut self) -> Result<String>;

    /// Speak `text`, returning once playback has finished
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Release any capture resources held between attempts
    fn stop_listening(&mut self) -> Result<()> {
        Ok(())
    }
}
