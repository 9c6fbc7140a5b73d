//! Azure OpenAI chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    CompletionRequest, CompletionResponse, CompletionService, DeploymentName, PipelineError,
    ServiceFailure, ServiceKind,
};
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::AzureOpenAiConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// [`CompletionService`] backed by an Azure OpenAI chat deployment.
///
/// Authenticates with the `api-key` header and sends one system message and
/// one user message per request.
#[derive(Debug, Clone)]
pub struct AzureOpenAiProvider {
    http: Client,
    config: AzureOpenAiConfig,
}

impl AzureOpenAiProvider {
    /// Creates a provider from `config`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: AzureOpenAiConfig) -> Result<Self, PipelineError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// The deployment this provider calls.
    pub fn deployment(&self) -> &DeploymentName {
        &self.config.deployment
    }
}

#[async_trait]
impl CompletionService for AzureOpenAiProvider {
    #[tracing::instrument(skip_all, fields(deployment = %self.config.deployment))]
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, PipelineError> {
        let body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(prompt_chars = request.user_prompt.len(), "Requesting completion");
        let response = self
            .http
            .post(self.config.chat_completions_url())
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let text = response.text().await.map_err(transport_error)?;
        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            PipelineError::external(
                ServiceKind::Completion,
                ServiceFailure::MalformedPayload,
                format!("Failed to parse chat completion response: {e}"),
            )
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                PipelineError::external(
                    ServiceKind::Completion,
                    ServiceFailure::EmptyResponse,
                    "Chat completion returned no content",
                )
            })?;

        tracing::info!(response_chars = content.len(), "Completion received");
        Ok(CompletionResponse {
            text: content,
            model: parsed.model,
        })
    }
}

fn transport_error(e: reqwest::Error) -> PipelineError {
    let failure = if e.is_timeout() {
        ServiceFailure::Timeout
    } else {
        ServiceFailure::Unreachable
    };
    PipelineError::external(
        ServiceKind::Completion,
        failure,
        format!("Azure OpenAI request failed: {e}"),
    )
}

async fn status_error(response: Response) -> PipelineError {
    let status = response.status();
    let failure = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceFailure::Authentication,
        StatusCode::TOO_MANY_REQUESTS => ServiceFailure::RateLimited {
            retry_after: response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        },
        other => ServiceFailure::Status(other.as_u16()),
    };
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, "Azure OpenAI returned an error status");
    PipelineError::external(
        ServiceKind::Completion,
        failure,
        format!("Azure OpenAI API call failed with status {status}: {body}"),
    )
}
