//! Configuration for the chat-completion service and the agents that use it

use secrecy::SecretString;

/// Default chat model (deployment name on the hosted service)
pub const DEFAULT_MODEL_ID: &str = "gpt-35-turbo";

/// API version pinned for the hosted chat-completion service
pub const DEFAULT_API_VERSION: &str = "2023-05-15";

/// Connection settings for the hosted chat-completion service
#[derive(Clone, Debug)]
pub struct ChatServiceConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,

    /// API key sent in the `api-key` header
    pub api_key: SecretString,

    /// `api-version` query parameter
    pub api_version: String,
}

impl ChatServiceConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: SecretString::from(api_key.into()),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Override the API version
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

/// Configuration shared by every agent that calls the chat-completion service
///
/// Immutable once an agent has been constructed with it.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    /// Model identifier sent with each request
    pub model_id: String,

    /// Temperature for sampling (0.0 = deterministic)
    pub temperature: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            temperature: 0.0,
        }
    }
}

impl AgentConfig {
    /// Create a new agent configuration with the specified model
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.model_id, "gpt-35-turbo");
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = AgentConfig::new("gpt-4o").with_temperature(0.3);
        assert_eq!(config.model_id, "gpt-4o");
        assert_eq!(config.temperature, 0.3);
    }

    #[test]
    fn test_service_config_defaults_api_version() {
        use secrecy::ExposeSecret;

        let config = ChatServiceConfig::new("https://example.openai.azure.com", "key");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.api_key.expose_secret(), "key");

        let config = config.with_api_version("2024-02-01");
        assert_eq!(config.api_version, "2024-02-01");
    }
}
