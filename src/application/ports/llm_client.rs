use async_trait::async_trait;

use crate::domain::PromptMessage;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmClientError {
    /// Stable category name exposed to API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiRequestFailed(_) => "api_request_failed",
            Self::RateLimited => "rate_limited",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}
