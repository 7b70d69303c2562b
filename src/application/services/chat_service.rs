use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::application::ports::{LlmClient, LlmClientError, RepositoryError, SessionRepository};
use crate::domain::{ChatSession, EmptyMessagePolicy, Message, SessionId};
use crate::infrastructure::observability::sanitize_prompt;

use super::document_service::DocumentSummary;
use super::prompt_builder::{DEFAULT_HISTORY_WINDOW, build_prompt};

#[derive(Debug, Clone)]
pub struct ChatServiceConfig {
    pub history_window: usize,
    pub empty_message_policy: EmptyMessagePolicy,
    /// Provider name used in the error turn, e.g. "OpenAI API Error: ...".
    pub provider_label: String,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            empty_message_policy: EmptyMessagePolicy::default(),
            provider_label: "OpenAI".to_string(),
        }
    }
}

pub struct ChatService<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    sessions: Arc<dyn SessionRepository>,
    config: ChatServiceConfig,
}

impl<L> ChatService<L>
where
    L: LlmClient,
{
    pub fn new(
        llm_client: Arc<L>,
        sessions: Arc<dyn SessionRepository>,
        config: ChatServiceConfig,
    ) -> Self {
        Self {
            llm_client,
            sessions,
            config,
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.count().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_session(&self) -> Result<SessionId, ChatServiceError> {
        let session = ChatSession::new();
        let id = session.id;
        self.sessions.insert(session).await?;
        tracing::info!(session_id = %id, "Chat session created");
        Ok(id)
    }

    pub async fn snapshot(&self, session_id: SessionId) -> Result<SessionSnapshot, ChatServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .map_err(|e| not_found(session_id, e))?;
        let mut session = handle.lock().await;
        session.touch();
        Ok(SessionSnapshot::from(&*session))
    }

    /// Discards sessions with no activity for longer than `max_idle`.
    pub async fn expire_idle_sessions(&self, max_idle: Duration) -> usize {
        let removed = self.sessions.remove_idle(Utc::now() - max_idle).await;
        if removed > 0 {
            tracing::info!(removed, "Expired idle chat sessions");
        }
        removed
    }

    #[tracing::instrument(skip(self))]
    pub async fn reset_session(&self, session_id: SessionId) -> Result<(), ChatServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .map_err(|e| not_found(session_id, e))?;
        handle.lock().await.reset();
        tracing::info!("Chat session reset");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_session(&self, session_id: SessionId) -> Result<(), ChatServiceError> {
        self.sessions
            .delete(session_id)
            .await
            .map_err(|e| not_found(session_id, e))?;
        tracing::info!("Chat session deleted");
        Ok(())
    }

    /// Appends the user turn, forwards the bounded prompt and appends exactly one
    /// assistant turn. Provider failures become the assistant turn's text and are
    /// reported in the outcome rather than as an error.
    #[tracing::instrument(skip(self, user_text), fields(session_id = %session_id))]
    pub async fn submit(
        &self,
        session_id: SessionId,
        user_text: &str,
    ) -> Result<SubmitOutcome, ChatServiceError> {
        if !self.config.empty_message_policy.accepts(user_text) {
            tracing::debug!(policy = ?self.config.empty_message_policy, "Ignoring empty message");
            return Err(ChatServiceError::EmptyMessage);
        }

        let handle = self
            .sessions
            .get(session_id)
            .await
            .map_err(|e| not_found(session_id, e))?;
        let mut session = handle.lock().await;

        tracing::debug!(prompt = %sanitize_prompt(user_text), "Processing user message");

        let user_turn = Message::user(user_text);
        session.append(user_turn.clone());

        let messages = build_prompt(
            session.context_text(),
            &session.transcript,
            self.config.history_window,
        );
        tracing::debug!(
            message_count = messages.len(),
            has_file_context = session.context_text().is_some(),
            "Forwarding prompt"
        );

        let (assistant_turn, failure) = match self.llm_client.complete(&messages).await {
            Ok(reply) => {
                tracing::info!(reply_chars = reply.len(), "Completion succeeded");
                (Message::assistant(reply), None)
            }
            Err(e) => {
                tracing::error!(error = %e, "Completion failed");
                let text = format!("{} API Error: {}", self.config.provider_label, e);
                (Message::assistant(text), Some(e))
            }
        };
        session.append(assistant_turn.clone());

        Ok(SubmitOutcome {
            user_turn,
            assistant_turn,
            failure,
        })
    }
}

fn not_found(session_id: SessionId, error: RepositoryError) -> ChatServiceError {
    match error {
        RepositoryError::NotFound(_) => ChatServiceError::SessionNotFound(session_id),
        other => ChatServiceError::Repository(other),
    }
}

/// Result of one accepted submission.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub user_turn: Message,
    pub assistant_turn: Message,
    pub failure: Option<LlmClientError>,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub transcript: Vec<Message>,
    pub document: Option<DocumentSummary>,
    pub created_at: DateTime<Utc>,
}

impl From<&ChatSession> for SessionSnapshot {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id,
            transcript: session.transcript.turns().to_vec(),
            document: session.document.as_ref().map(DocumentSummary::from),
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
