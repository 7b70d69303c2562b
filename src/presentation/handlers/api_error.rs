use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{ChatServiceError, DocumentServiceError};
use crate::domain::SessionId;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors the JSON API reports as non-2xx responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid session ID: {0}")]
    InvalidSessionId(String),
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Failed to extract file: {0}")]
    ExtractionFailed(String),
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidSessionId(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyMessage | Self::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<ChatServiceError> for ApiError {
    fn from(error: ChatServiceError) -> Self {
        match error {
            ChatServiceError::EmptyMessage => Self::EmptyMessage,
            ChatServiceError::SessionNotFound(id) => Self::SessionNotFound(id),
            ChatServiceError::Repository(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<DocumentServiceError> for ApiError {
    fn from(error: DocumentServiceError) -> Self {
        match error {
            DocumentServiceError::SessionNotFound(id) => Self::SessionNotFound(id),
            DocumentServiceError::Extraction(e) => Self::ExtractionFailed(e.to_string()),
            DocumentServiceError::Repository(e) => Self::Internal(e.to_string()),
        }
    }
}

pub fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    Uuid::parse_str(raw)
        .map(SessionId::from_uuid)
        .map_err(|_| ApiError::InvalidSessionId(raw.to_string()))
}
