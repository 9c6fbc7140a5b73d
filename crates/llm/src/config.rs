//! Connection settings for the Azure OpenAI provider.

use std::time::Duration;

use pipeline::DeploymentName;

/// Everything needed to reach one Azure OpenAI chat deployment.
///
/// `endpoint`, `api_key`, `api_version`, and `deployment` are required and
/// validated by the composition root before a provider is built.
#[derive(Clone, PartialEq)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com/`.
    pub endpoint: String,
    /// Resource key, sent as the `api-key` header.
    pub api_key: String,
    /// REST API version, e.g. `2024-10-21`.
    pub api_version: String,
    /// Model deployment to call, e.g. `gpt-4o`.
    pub deployment: DeploymentName,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl AzureOpenAiConfig {
    /// Creates a config with the default sampling parameters
    /// (temperature 0.7, 1000 tokens, 60 s timeout).
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        deployment: DeploymentName,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
            deployment,
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(60),
        }
    }

    /// Chat-completions URL for the configured deployment.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

// The key never appears in logs or panic messages.
impl std::fmt::Debug for AzureOpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AzureOpenAiConfig {
        AzureOpenAiConfig::new(
            "https://example.openai.azure.com/",
            "secret-key",
            "2024-10-21",
            DeploymentName::new("gpt-4o").unwrap(),
        )
    }

    #[test]
    fn url_joins_endpoint_deployment_and_version() {
        assert_eq!(
            config().chat_completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
