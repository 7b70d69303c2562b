use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{ChatSession, SessionId};

use super::RepositoryError;

/// Shared handle to one session. Holding the lock serialises work on that session.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: ChatSession) -> Result<SessionHandle, RepositoryError>;

    async fn get(&self, id: SessionId) -> Result<SessionHandle, RepositoryError>;

    async fn delete(&self, id: SessionId) -> Result<(), RepositoryError>;

    async fn count(&self) -> usize;

    /// Drops sessions last active before `cutoff` and returns how many went.
    /// Sessions locked by an in-flight request are kept.
    async fn remove_idle(&self, cutoff: DateTime<Utc>) -> usize;
}
