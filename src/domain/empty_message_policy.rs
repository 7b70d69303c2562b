use serde::Deserialize;

/// Decides which submissions count as empty and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyMessagePolicy {
    /// Ignore empty and whitespace-only text (explicit send button).
    #[default]
    RejectBlank,
    /// Ignore only the empty string; the input control never submits one.
    RejectEmpty,
}

impl EmptyMessagePolicy {
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            Self::RejectBlank => !text.trim().is_empty(),
            Self::RejectEmpty => !text.is_empty(),
        }
    }
}
