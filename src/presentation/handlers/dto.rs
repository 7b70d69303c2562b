use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClientError;
use crate::application::services::{DocumentSummary, SessionSnapshot, SubmitOutcome};
use crate::domain::Message;

#[derive(Debug, Serialize)]
pub struct TurnView {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for TurnView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.as_uuid().to_string(),
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub filename: String,
    pub file_type: Option<String>,
    pub size_bytes: u64,
    pub supported: bool,
    pub extracted_chars: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&DocumentSummary> for DocumentView {
    fn from(summary: &DocumentSummary) -> Self {
        Self {
            filename: summary.filename.clone(),
            file_type: summary.kind.map(|k| k.extension().to_string()),
            size_bytes: summary.size_bytes,
            supported: summary.supported,
            extracted_chars: summary.extracted_chars,
            uploaded_at: summary.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub transcript: Vec<TurnView>,
    pub document: Option<DocumentView>,
    pub created_at: DateTime<Utc>,
}

impl From<&SessionSnapshot> for SessionResponse {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            session_id: snapshot.id.to_string(),
            transcript: snapshot.transcript.iter().map(TurnView::from).collect(),
            document: snapshot.document.as_ref().map(DocumentView::from),
            created_at: snapshot.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderErrorView {
    pub kind: String,
    pub message: String,
}

impl From<&LlmClientError> for ProviderErrorView {
    fn from(error: &LlmClientError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub user_turn: TurnView,
    pub assistant_turn: TurnView,
    pub error: Option<ProviderErrorView>,
}

impl From<&SubmitOutcome> for SubmitResponse {
    fn from(outcome: &SubmitOutcome) -> Self {
        Self {
            user_turn: TurnView::from(&outcome.user_turn),
            assistant_turn: TurnView::from(&outcome.assistant_turn),
            error: outcome.failure.as_ref().map(ProviderErrorView::from),
        }
    }
}
