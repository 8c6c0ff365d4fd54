//! Speech-to-text against the hosted short-audio recognition endpoint

use crate::speech::config::SpeechServiceConfig;
use crate::{ClerkError, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Outcome reported by the recognition service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum RecognitionStatus {
    Success,
    NoMatch,
    InitialSilenceTimeout,
    BabbleTimeout,
    Error,
    #[serde(other)]
    Unknown,
}

/// Result of one recognition attempt
#[derive(Clone, Debug, PartialEq)]
pub struct RecognitionResult {
    pub status: RecognitionStatus,

    /// Recognized text; empty unless `status` is `Success`
    pub text: String,
}

impl RecognitionResult {
    /// Result for an attempt that never reached the service
    pub fn no_speech() -> Self {
        Self {
            status: RecognitionStatus::InitialSilenceTimeout,
            text: String::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleResponse {
    recognition_status: RecognitionStatus,
    #[serde(default)]
    display_text: Option<String>,
}

/// Client for one-shot recognition of a WAV utterance
pub struct AzureRecognizer {
    http: Client,
    runtime: Arc<Runtime>,
    url: String,
    subscription_key: SecretString,
}

impl AzureRecognizer {
    pub fn new(config: &SpeechServiceConfig, runtime: Arc<Runtime>) -> Self {
        Self {
            http: Client::new(),
            runtime,
            url: config.recognition_url(),
            subscription_key: config.subscription_key.clone(),
        }
    }

    /// Recognize a 16 kHz, 16-bit mono PCM WAV utterance
    pub fn recognize(&self, wav: Vec<u8>) -> Result<RecognitionResult> {
        self.runtime.block_on(self.send(wav))
    }

    async fn send(&self, wav: Vec<u8>) -> Result<RecognitionResult> {
        let start = Instant::now();
        let bytes = wav.len();

        let response = self
            .http
            .post(&self.url)
            .header("Ocp-Apim-Subscription-Key", self.subscription_key.expose_secret())
            .header("Content-Type", "audio/wav; codecs=audio/pcm; samplerate=16000")
            .header("Accept", "application/json")
            .body(wav)
            .send()
            .await
            .map_err(|e| ClerkError::TranscriptionError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClerkError::TranscriptionError(format!(
                "Service returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClerkError::TranscriptionError(format!("Failed to read response: {}", e)))?;
        let result = parse_recognition(&body)?;

        debug!(
            bytes,
            status = ?result.status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Recognition finished"
        );

        Ok(result)
    }
}

fn parse_recognition(body: &str) -> Result<RecognitionResult> {
    let response: SimpleResponse = serde_json::from_str(body)
        .map_err(|e| ClerkError::TranscriptionError(format!("Malformed response: {}", e)))?;

    match response.recognition_status {
        RecognitionStatus::Success => Ok(RecognitionResult {
            status: RecognitionStatus::Success,
            text: response.display_text.unwrap_or_default(),
        }),
        RecognitionStatus::Error => Err(ClerkError::TranscriptionError(
            "Recognition service reported an error".into(),
        )),
        other => {
            if other == RecognitionStatus::Unknown {
                warn!("Unrecognized recognition status in response: {}", body);
            }
            Ok(RecognitionResult {
                status: other,
                text: String::new(),
            })
        }
    }
}
