use super::{Message, MessageRole};

/// One entry of the message list forwarded to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

impl From<&Message> for PromptMessage {
    fn from(message: &Message) -> Self {
        Self::new(message.role, message.content.clone())
    }
}
