//! Text-to-speech against the hosted synthesis endpoint
//!
//! Replies are cleaned up for speech, wrapped in SSML and sent to the service,
//! which answers with a RIFF/WAV body ready for playback.

use crate::speech::config::SpeechServiceConfig;
use crate::{ClerkError, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::debug;

/// Client for the synthesis endpoint
pub struct AzureSynthesizer {
    http: Client,
    runtime: Arc<Runtime>,
    url: String,
    subscription_key: SecretString,
    voice: String,
    language: String,
    output_format: String,
}

impl AzureSynthesizer {
    pub fn new(config: &SpeechServiceConfig, runtime: Arc<Runtime>) -> Self {
        Self {
            http: Client::new(),
            runtime,
            url: config.synthesis_url(),
            subscription_key: config.subscription_key.clone(),
            voice: config.voice.clone(),
            language: config.language.clone(),
            output_format: config.output_format.clone(),
        }
    }

    /// Synthesize `text` and return the encoded audio.
    ///
    /// Returns `None` when there is nothing left to say after cleanup.
    pub fn synthesize(&self, text: &str) -> Result<Option<Vec<u8>>> {
        let spoken = prepare_for_speech(text);
        if spoken.is_empty() {
            return Ok(None);
        }
        let ssml = build_ssml(&self.voice, &self.language, &spoken);
        self.runtime.block_on(self.send(ssml)).map(Some)
    }

    async fn send(&self, ssml: String) -> Result<Vec<u8>> {
        let start = Instant::now();

        let response = self
            .http
            .post(&self.url)
            .header("Ocp-Apim-Subscription-Key", self.subscription_key.expose_secret())
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.output_format)
            .header("User-Agent", "clerk")
            .body(ssml)
            .send()
            .await
            .map_err(|e| ClerkError::TTSError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClerkError::TTSError(format!(
                "Service returned {}: {}",
                status, body
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ClerkError::TTSError(format!("Failed to read audio: {}", e)))?
            .to_vec();

        debug!(
            bytes = audio.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Synthesis finished"
        );

        Ok(audio)
    }
}

/// Strip markdown markers and collapse whitespace so the reply reads naturally
pub fn prepare_for_speech(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let line = line.trim_start();
        let line = line.trim_start_matches('#').trim_start();
        let line = line
            .strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
            .unwrap_or(line);

        for c in line.chars() {
            match c {
                '*' | '_' | '`' => {}
                '&' => result.push_str(" and "),
                '%' => result.push_str(" percent"),
                _ => result.push(c),
            }
        }
        result.push(' ');
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wrap plain text in an SSML document for `voice`
pub fn build_ssml(voice: &str, language: &str, text: &str) -> String {
    format!(
        "<speak version='1.0' xml:lang='{}'><voice name='{}'>{}</voice></speak>",
        escape_xml(language),
        escape_xml(voice),
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_strips_markdown() {
        let text = "## Options\n- **M6** bolts\n- `M8` bolts\n\nBoth are in stock.";
        assert_eq!(
            prepare_for_speech(text),
            "Options M6 bolts M8 bolts Both are in stock."
        );
    }

    #[test]
    fn test_prepare_expands_symbols() {
        assert_eq!(
            prepare_for_speech("Glue & clamps, 10% off"),
            "Glue and clamps, 10 percent off"
        );
    }

    #[test]
    fn test_prepare_empty() {
        assert_eq!(prepare_for_speech("  \n ** \n"), "");
    }

    #[test]
    fn test_ssml_is_escaped() {
        let ssml = build_ssml("en-US-AvaMultilingualNeural", "en-US", "4mm <thin> 'board'");
        assert_eq!(
            ssml,
            "<speak version='1.0' xml:lang='en-US'><voice name='en-US-AvaMultilingualNeural'>4mm &lt;thin&gt; &apos;board&apos;</voice></speak>"
        );
    }

    #[test]
    fn test_synthesize_skips_empty_text() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let synthesizer = AzureSynthesizer::new(
            &SpeechServiceConfig::new("key", "westeurope"),
            Arc::new(runtime),
        );
        assert_eq!(synthesizer.synthesize("   ").unwrap(), None);
    }
}
