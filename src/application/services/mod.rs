mod chat_service;
mod document_service;
mod prompt_builder;

pub use chat_service::{
    ChatService, ChatServiceConfig, ChatServiceError, SessionSnapshot, SubmitOutcome,
};
pub use document_service::{DocumentService, DocumentServiceError, DocumentSummary};
pub use prompt_builder::{DEFAULT_HISTORY_WINDOW, build_prompt, file_context};
