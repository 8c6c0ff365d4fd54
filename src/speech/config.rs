//! Configuration for the hosted speech service

use secrecy::SecretString;

/// Default neural voice for synthesis
pub const DEFAULT_VOICE: &str = "en-US-AvaMultilingualNeural";

/// Default recognition/synthesis locale
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Audio format requested from the synthesis endpoint
pub const DEFAULT_OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";

/// Connection and voice settings for the speech service
#[derive(Clone, Debug)]
pub struct SpeechServiceConfig {
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`
    pub subscription_key: SecretString,

    /// Service region, e.g. `westeurope`
    pub region: String,

    /// Locale used for recognition and synthesis
    pub language: String,

    /// Voice name used for synthesis
    pub voice: String,

    /// `X-Microsoft-OutputFormat` for synthesis
    pub output_format: String,
}

impl SpeechServiceConfig {
    pub fn new(subscription_key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            subscription_key: SecretString::from(subscription_key.into()),
            region: region.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        }
    }

    /// Set the synthesis voice
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the locale
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Short-audio recognition endpoint for this region
    pub fn recognition_url(&self) -> String {
        format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={}&format=simple",
            self.region, self.language
        )
    }

    /// Synthesis endpoint for this region
    pub fn synthesis_url(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.region
        )
    }
}
