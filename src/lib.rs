pub mod agents;
pub mod audio;
pub mod integration;
pub mod llm;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ClerkError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Chat completion error: {0}")]
    InferenceError(String),

    #[error("Speech recognition error: {0}")]
    TranscriptionError(String),

    #[error("TTS error: {0}")]
    TTSError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for ClerkError {
    fn from(e: std::io::Error) -> Self {
        ClerkError::IOError(e.to_string())
    }
}

impl ClerkError {
    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ClerkError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            ClerkError::AudioProcessingError(_) => {
                "Audio processing failed.".to_string()
            }
            ClerkError::ConfigError(_) => {
                "Configuration error. Please check the environment variables.".to_string()
            }
            ClerkError::InferenceError(_) => {
                "The chat service could not produce a response.".to_string()
            }
            ClerkError::TranscriptionError(_) => {
                "Speech recognition failed.".to_string()
            }
            ClerkError::TTSError(_) => {
                "Text-to-speech failed.".to_string()
            }
            ClerkError::IOError(_) => "I/O error occurred.".to_string(),
            ClerkError::ChannelError(_) => {
                "Internal communication error.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ClerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: ClerkError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(matches!(err, ClerkError::IOError(ref msg) if msg == "disk"));
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ClerkError::InferenceError("401 Unauthorized".into());
        assert_eq!(err.to_string(), "Chat completion error: 401 Unauthorized");
        assert!(err.user_message().contains("chat service"));
    }
}
