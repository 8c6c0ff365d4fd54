//! Application configuration
//!
//! Built once at start-up and handed to every client and agent constructor.

use crate::audio::CaptureConfig;
use crate::llm::config::{AgentConfig, ChatServiceConfig};
use crate::speech::config::SpeechServiceConfig;
use crate::{ClerkError, Result};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const ENV_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_OPENAI_KEY: &str = "AZURE_OPENAI_KEY";
pub const ENV_OPENAI_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
pub const ENV_CHAT_MODEL: &str = "CLERK_CHAT_MODEL";
pub const ENV_MAX_SENTENCES: &str = "CLERK_MAX_SENTENCES";
pub const ENV_SPEECH_KEY: &str = "AZURE_SPEECH_KEY";
pub const ENV_SPEECH_REGION: &str = "AZURE_SPEECH_REGION";
pub const ENV_SPEECH_VOICE: &str = "CLERK_SPEECH_VOICE";
pub const ENV_SPEECH_LANGUAGE: &str = "CLERK_SPEECH_LANGUAGE";
pub const ENV_SPEECH_MODE: &str = "CLERK_SPEECH_MODE";

/// Upper bound on sentences per domain-agent reply
pub const DEFAULT_MAX_SENTENCES: usize = 2;

/// How the assistant hears and talks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechMode {
    /// Microphone and speaker through the hosted speech service
    Voice,
    /// Typed input on stdin, replies on stdout
    Console,
}

impl Default for SpeechMode {
    fn default() -> Self {
        if cfg!(feature = "audio-io") {
            SpeechMode::Voice
        } else {
            SpeechMode::Console
        }
    }
}

impl FromStr for SpeechMode {
    type Err = ClerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "voice" => Ok(SpeechMode::Voice),
            "console" => Ok(SpeechMode::Console),
            other => Err(ClerkError::ConfigError(format!(
                "{} must be 'voice' or 'console', got '{}'",
                ENV_SPEECH_MODE, other
            ))),
        }
    }
}

impl fmt::Display for SpeechMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechMode::Voice => write!(f, "voice"),
            SpeechMode::Console => write!(f, "console"),
        }
    }
}

/// Configuration for the complete assistant
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub chat: ChatServiceConfig,

    /// Present when speech credentials were supplied
    pub speech: Option<SpeechServiceConfig>,

    pub capture: CaptureConfig,

    /// Shared by every agent
    pub agent: AgentConfig,

    pub max_sentences: usize,

    pub mode: SpeechMode,
}

impl AppConfig {
    pub fn new(chat: ChatServiceConfig) -> Self {
        Self {
            chat,
            speech: None,
            capture: CaptureConfig::default(),
            agent: AgentConfig::default(),
            max_sentences: DEFAULT_MAX_SENTENCES,
            mode: SpeechMode::default(),
        }
    }

    pub fn with_speech(mut self, speech: SpeechServiceConfig) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_mode(mut self, mode: SpeechMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_max_sentences(mut self, max_sentences: usize) -> Self {
        self.max_sentences = max_sentences;
        self
    }

    /// Read configuration from the process environment, falling back to a
    /// `.env` file found in the working directory or one of its parents
    ///
    /// Variables already set in the environment win over the file.
    pub fn from_env() -> Result<Self> {
        let file = match dotenvy::dotenv_iter() {
            Ok(iter) => read_dotenv(iter)?,
            Err(e) if e.not_found() => HashMap::new(),
            Err(e) => return Err(ClerkError::ConfigError(format!("Failed to read .env: {}", e))),
        };
        Self::from_env_and(file)
    }

    /// Like `from_env`, with the fallback values taken from `path`
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ClerkError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_env_and(read_dotenv(iter)?)
    }

    fn from_env_and(file: HashMap<String, String>) -> Result<Self> {
        if !file.is_empty() {
            debug!("Loaded {} variables from .env", file.len());
        }
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Read configuration through `lookup`, which returns `None` for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let require = |key: &str| {
            get(key).ok_or_else(|| ClerkError::ConfigError(format!("{} is not set", key)))
        };

        let mut chat = ChatServiceConfig::new(require(ENV_OPENAI_ENDPOINT)?, require(ENV_OPENAI_KEY)?);
        if let Some(version) = get(ENV_OPENAI_API_VERSION) {
            chat = chat.with_api_version(version);
        }

        let mut config = Self::new(chat);

        if let Some(model) = get(ENV_CHAT_MODEL) {
            config.agent = AgentConfig::new(model);
        }

        if let Some(raw) = get(ENV_MAX_SENTENCES) {
            config.max_sentences = raw.parse().map_err(|_| {
                ClerkError::ConfigError(format!("{} must be a positive integer, got '{}'", ENV_MAX_SENTENCES, raw))
            })?;
        }

        if let Some(raw) = get(ENV_SPEECH_MODE) {
            config.mode = raw.parse()?;
        }

        if let (Some(key), Some(region)) = (get(ENV_SPEECH_KEY), get(ENV_SPEECH_REGION)) {
            let mut speech = SpeechServiceConfig::new(key, region);
            if let Some(voice) = get(ENV_SPEECH_VOICE) {
                speech = speech.with_voice(voice);
            }
            if let Some(language) = get(ENV_SPEECH_LANGUAGE) {
                speech = speech.with_language(language);
            }
            config.speech = Some(speech);
        }

        Ok(config)
    }

    /// Reject settings that would only fail later, mid-conversation
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.chat.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ClerkError::ConfigError(format!("{} is empty", ENV_OPENAI_ENDPOINT)));
        }
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ClerkError::ConfigError(format!(
                "{} must be an http(s) URL, got '{}'",
                ENV_OPENAI_ENDPOINT, endpoint
            )));
        }
        if self.chat.api_key.expose_secret().is_empty() {
            return Err(ClerkError::ConfigError(format!("{} is empty", ENV_OPENAI_KEY)));
        }

        if self.max_sentences == 0 {
            return Err(ClerkError::ConfigError(format!("{} must be at least 1", ENV_MAX_SENTENCES)));
        }
        if !(0.0..=2.0).contains(&self.agent.temperature) {
            return Err(ClerkError::ConfigError(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.agent.temperature
            )));
        }

        if self.mode == SpeechMode::Voice {
            if !cfg!(feature = "audio-io") {
                return Err(ClerkError::ConfigError(
                    "Voice mode needs a build with the `audio-io` feature".into(),
                ));
            }
            let speech = self.speech.as_ref().ok_or_else(|| {
                ClerkError::ConfigError(format!(
                    "Voice mode needs {} and {}",
                    ENV_SPEECH_KEY, ENV_SPEECH_REGION
                ))
            })?;
            if speech.subscription_key.expose_secret().is_empty() {
                return Err(ClerkError::ConfigError(format!("{} is empty", ENV_SPEECH_KEY)));
            }
            if speech.region.is_empty() {
                return Err(ClerkError::ConfigError(format!("{} is empty", ENV_SPEECH_REGION)));
            }
        }

        Ok(())
    }
}

fn read_dotenv(iter: dotenvy::Iter<File>) -> Result<HashMap<String, String>> {
    iter.collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(|e| ClerkError::ConfigError(format!("Malformed .env: {}", e)))
}
