use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::application::ports::{RepositoryError, SessionHandle, SessionRepository};
use crate::domain::{ChatSession, SessionId};

/// Process-local session store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: ChatSession) -> Result<SessionHandle, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "session {} already exists",
                session.id
            )));
        }

        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    async fn get(&self, id: SessionId) -> Result<SessionHandle, RepositoryError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: SessionId) -> Result<(), RepositoryError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn remove_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.is_idle_since(cutoff),
            Err(_) => true,
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;

    #[tokio::test]
    async fn given_inserted_session_when_getting_then_returns_same_handle() {
        let repository = InMemorySessionRepository::new();
        let session = ChatSession::new();
        let id = session.id;

        let inserted = repository.insert(session).await.unwrap();
        inserted.lock().await.append(Message::user("hello"));

        let fetched = repository.get(id).await.unwrap();
        assert_eq!(fetched.lock().await.transcript.len(), 1);
    }

    #[tokio::test]
    async fn given_duplicate_id_when_inserting_then_returns_constraint_violation() {
        let repository = InMemorySessionRepository::new();
        let session = ChatSession::new();
        repository.insert(session.clone()).await.unwrap();

        let result = repository.insert(session).await;

        assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn given_deleted_session_when_getting_then_returns_not_found() {
        let repository = InMemorySessionRepository::new();
        let session = ChatSession::new();
        let id = session.id;
        repository.insert(session).await.unwrap();

        repository.delete(id).await.unwrap();

        assert!(matches!(repository.get(id).await, Err(RepositoryError::NotFound(_))));
        assert!(matches!(repository.delete(id).await, Err(RepositoryError::NotFound(_))));
        assert_eq!(repository.count().await, 0);
    }

    #[tokio::test]
    async fn given_idle_and_active_sessions_when_removing_idle_then_only_idle_dropped() {
        let repository = InMemorySessionRepository::new();
        let mut idle = ChatSession::new();
        idle.last_active = Utc::now() - chrono::Duration::hours(2);
        let idle_id = idle.id;
        let active = ChatSession::new();
        let active_id = active.id;
        repository.insert(idle).await.unwrap();
        repository.insert(active).await.unwrap();

        let removed = repository
            .remove_idle(Utc::now() - chrono::Duration::hours(1))
            .await;

        assert_eq!(removed, 1);
        assert!(matches!(repository.get(idle_id).await, Err(RepositoryError::NotFound(_))));
        assert!(repository.get(active_id).await.is_ok());
    }

    #[tokio::test]
    async fn given_idle_session_in_use_when_removing_idle_then_kept() {
        let repository = InMemorySessionRepository::new();
        let mut session = ChatSession::new();
        session.last_active = Utc::now() - chrono::Duration::hours(2);
        let handle = repository.insert(session).await.unwrap();
        let _guard = handle.lock().await;

        let removed = repository.remove_idle(Utc::now()).await;

        assert_eq!(removed, 0);
        assert_eq!(repository.count().await, 1);
    }
}
