//! Log-safe previews of chat messages.

const PREVIEW_CHARS: usize = 100;
const MASK: &str = "[REDACTED]";

/// Markers whose value, up to the next delimiter, is masked.
const SECRET_MARKERS: [&str; 5] = ["Bearer ", "api_key=", "password=", "secret=", "token="];

/// Masks credential-looking values, then shortens the text to a preview.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    preview(&mask_secrets(trimmed))
}

fn preview(text: &str) -> String {
    let total = text.chars().count();
    if total <= PREVIEW_CHARS {
        return text.to_string();
    }
    let visible: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{visible}... ({total} chars total)")
}

fn mask_secrets(text: &str) -> String {
    let mut masked = text.to_string();
    for marker in SECRET_MARKERS {
        let mut from = 0;
        while let Some(offset) = masked[from..].find(marker) {
            let value_start = from + offset + marker.len();
            let value_end = masked[value_start..]
                .find(is_delimiter)
                .map_or(masked.len(), |i| value_start + i);
            masked.replace_range(value_start..value_end, MASK);
            from = value_start + MASK.len();
        }
    }
    masked
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '&' | '"' | '\'' | ',' | ';')
}
