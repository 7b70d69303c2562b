use std::sync::Arc;

use crate::application::ports::{FileLoader, LlmClient};
use crate::application::services::{ChatService, DocumentService};
use crate::presentation::config::UiSettings;

pub struct AppState<F, L>
where
    F: FileLoader,
    L: LlmClient,
{
    pub chat_service: Arc<ChatService<L>>,
    pub document_service: Arc<DocumentService<F>>,
    pub ui: UiSettings,
    pub max_upload_bytes: usize,
}

impl<F, L> Clone for AppState<F, L>
where
    F: FileLoader,
    L: LlmClient,
{
    fn clone(&self) -> Self {
        Self {
            chat_service: Arc::clone(&self.chat_service),
            document_service: Arc::clone(&self.document_service),
            ui: self.ui.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
