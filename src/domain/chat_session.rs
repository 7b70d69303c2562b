use chrono::{DateTime, Utc};

use super::{Message, SessionId, Transcript, UploadedDocument};

/// State owned by one browser session: its transcript and at most one document.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: SessionId,
    pub transcript: Transcript,
    pub document: Option<UploadedDocument>,
    pub created_at: DateTime<Utc>,
    /// Last time the session was read or changed.
    pub last_active: DateTime<Utc>,
}

impl ChatSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            transcript: Transcript::new(),
            document: None,
            created_at: now,
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_active < cutoff
    }

    pub fn append(&mut self, message: Message) {
        self.transcript.push(message);
        self.touch();
    }

    /// Replaces any previous document.
    pub fn attach_document(&mut self, document: UploadedDocument) {
        self.document = Some(document);
        self.touch();
    }

    pub fn clear_document(&mut self) -> Option<UploadedDocument> {
        self.touch();
        self.document.take()
    }

    /// Extracted text to send as file context, if there is any.
    pub fn context_text(&self) -> Option<&str> {
        self.document
            .as_ref()
            .map(|d| d.text.as_str())
            .filter(|text| !text.is_empty())
    }

    pub fn reset(&mut self) {
        self.transcript.clear();
        self.document = None;
        self.touch();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
