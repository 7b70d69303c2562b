use crate::domain::{PromptMessage, Transcript};

pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Wraps extracted document text as the system turn content.
pub fn file_context(text: &str) -> String {
    format!("The following is the content of the uploaded file:\n{text}\n\n")
}

/// Builds the message list for one completion call.
///
/// The list is an optional system turn carrying the file context followed by
/// the newest `history_window` transcript turns. The caller appends the new
/// user turn to the transcript before building, so it is always the last entry.
pub fn build_prompt(
    context: Option<&str>,
    transcript: &Transcript,
    history_window: usize,
) -> Vec<PromptMessage> {
    let history = transcript.last(history_window);
    let mut messages = Vec::with_capacity(history.len() + 1);

    if let Some(text) = context.filter(|t| !t.is_empty()) {
        messages.push(PromptMessage::system(file_context(text)));
    }

    messages.extend(history.iter().map(PromptMessage::from));
    messages
}
