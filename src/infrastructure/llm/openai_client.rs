use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::PromptMessage;
use crate::presentation::config::LlmSettings;

/// Non-streaming client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    completions_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: usize,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `{"error": {"message": ...}}` as returned alongside non-2xx statuses.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()
            .map_err(|e| LlmClientError::ApiRequestFailed(format!("client setup: {e}")))?;

        Ok(Self {
            client,
            completions_url: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            api_key: settings.api_key.clone(),
            model: settings.chat_model.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Maps a non-2xx reply, preferring the provider's own error message.
fn status_error(status: StatusCode, body: &str) -> LlmClientError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return LlmClientError::RateLimited;
    }
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    LlmClientError::ApiRequestFailed(format!("HTTP {status}: {detail}"))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[tracing::instrument(skip(self, messages), fields(model = %self.model, message_count = messages.len()))]
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmClientError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Completion request rejected");
            return Err(status_error(status, &body));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let Some(choice) = completion.choices.into_iter().next() else {
            return Err(LlmClientError::InvalidResponse("empty choices".to_string()));
        };

        Ok(choice.message.content.unwrap_or_default())
    }
}
