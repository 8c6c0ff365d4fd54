//! Chat-completion service seam and the hosted client behind it

use crate::llm::config::{AgentConfig, ChatServiceConfig};
use crate::llm::context::ConversationMessage;
use crate::{ClerkError, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::debug;

/// One chat-completion request: ordered turns plus sampling settings
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ConversationMessage>,
}

impl ChatRequest {
    pub fn new(config: &AgentConfig, messages: Vec<ConversationMessage>) -> Self {
        Self {
            model: config.model_id.clone(),
            temperature: config.temperature,
            messages,
        }
    }
}

/// Anything that can turn a list of turns into a single assistant reply
///
/// Calls block until the service answers.
pub trait ChatCompletion: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String>;
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an Azure OpenAI chat-completions deployment
pub struct AzureChatClient {
    http: Client,
    runtime: Arc<Runtime>,
    endpoint: String,
    api_key: SecretString,
    api_version: String,
}

impl AzureChatClient {
    pub fn new(config: &ChatServiceConfig, runtime: Arc<Runtime>) -> Self {
        Self {
            http: Client::new(),
            runtime,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// URL of the completions route for a deployment
    pub fn completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        )
    }

    async fn send(&self, request: &ChatRequest) -> Result<String> {
        let body = build_body(request);
        let start = Instant::now();

        let response = self
            .http
            .post(self.completions_url(&request.model))
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClerkError::InferenceError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ClerkError::InferenceError(format!(
                "Service returned {}: {}",
                status, error_body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ClerkError::InferenceError(format!("Failed to read response: {}", e)))?;
        let content = parse_completion(&text)?;

        debug!(
            model = %request.model,
            turns = request.messages.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Chat completion finished"
        );

        Ok(content)
    }
}

impl ChatCompletion for AzureChatClient {
    fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.runtime.block_on(self.send(request))
    }
}

fn build_body(request: &ChatRequest) -> CompletionBody<'_> {
    CompletionBody {
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
        temperature: request.temperature,
    }
}

/// Extract the first choice's text from a completions response body
fn parse_completion(body: &str) -> Result<String> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ClerkError::InferenceError(format!("Malformed response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| ClerkError::InferenceError("Response contained no choices".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::config::DEFAULT_API_VERSION;

    fn client(endpoint: &str) -> AzureChatClient {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        AzureChatClient::new(&ChatServiceConfig::new(endpoint, "secret"), Arc::new(runtime))
    }

    #[test]
    fn test_completions_url() {
        let client = client("https://store.openai.azure.com/");
        assert_eq!(
            client.completions_url("gpt-35-turbo"),
            format!(
                "https://store.openai.azure.com/openai/deployments/gpt-35-turbo/chat/completions?api-version={}",
                DEFAULT_API_VERSION
            )
        );
    }

    #[test]
    fn test_body_serialization() {
        let request = ChatRequest::new(
            &AgentConfig::default(),
            vec![
                ConversationMessage::system("You are a fastener expert."),
                ConversationMessage::user("Respond in up to 2 sentences: m6 or m8?"),
            ],
        );

        let json = serde_json::to_value(build_body(&request)).unwrap();
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(
            json["messages"][1]["content"],
            "Respond in up to 2 sentences: m6 or m8?"
        );
        assert!(json["messages"][0].get("timestamp").is_none());
    }

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"[Wood]"}},
                      {"index":1,"message":{"role":"assistant","content":"[General]"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "[Wood]");
    }

    #[test]
    fn test_parse_null_content_is_empty() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "");
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(ClerkError::InferenceError(_))
        ));
        assert!(matches!(
            parse_completion("not json"),
            Err(ClerkError::InferenceError(_))
        ));
    }
}
