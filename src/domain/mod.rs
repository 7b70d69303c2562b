mod chat_session;
mod document;
mod empty_message_policy;
mod message;
mod message_id;
mod message_role;
mod prompt_message;
mod session_id;
mod transcript;

pub use chat_session::ChatSession;
pub use document::{Document, FileKind, UNSUPPORTED_FILE_TYPE, UploadedDocument};
pub use empty_message_policy::EmptyMessagePolicy;
pub use message::Message;
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use prompt_message::PromptMessage;
pub use session_id::SessionId;
pub use transcript::Transcript;
