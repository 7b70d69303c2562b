use minijinja::Environment;
use serde::Serialize;

use crate::application::services::SessionSnapshot;
use crate::domain::FileKind;
use crate::presentation::config::{RenderStyle, UiSettings};

/// The `.html` suffix turns on minijinja's HTML auto-escaping.
const TEMPLATE_NAME: &str = "chat_page.html";
const TEMPLATE_SOURCE: &str = include_str!("templates/chat_page.html");

/// Everything needed to draw one session's page.
pub struct ChatPage<'a> {
    pub ui: &'a UiSettings,
    pub snapshot: &'a SessionSnapshot,
    /// Error shown above the upload form, e.g. a failed extraction.
    pub error: Option<&'a str>,
}

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    chat_heading: &'a str,
    features: &'a [String],
    style: &'static str,
    session_id: String,
    accept: String,
    error: Option<&'a str>,
    document: Option<&'a str>,
    turns: Vec<TurnContext<'a>>,
}

#[derive(Serialize)]
struct TurnContext<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> PageContext<'a> {
    fn new(page: &ChatPage<'a>) -> Self {
        let accept = FileKind::all()
            .iter()
            .map(|k| format!(".{}", k.extension()))
            .collect::<Vec<_>>()
            .join(",");

        Self {
            title: &page.ui.title,
            chat_heading: &page.ui.chat_heading,
            features: &page.ui.features,
            style: match page.ui.render_style {
                RenderStyle::Bubbles => "bubbles",
                RenderStyle::Panel => "panel",
            },
            session_id: page.snapshot.id.to_string(),
            accept,
            error: page.error,
            document: page.snapshot.document.as_ref().map(|d| d.filename.as_str()),
            turns: page
                .snapshot
                .transcript
                .iter()
                .map(|turn| TurnContext {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
        }
    }
}

/// Draws the whole page: header, upload form, transcript and input.
pub fn render_chat_page(page: &ChatPage<'_>) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;
    env.get_template(TEMPLATE_NAME)?.render(PageContext::new(page))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Message, SessionId};

    fn snapshot(turns: Vec<Message>) -> SessionSnapshot {
        SessionSnapshot {
            id: SessionId::new(),
            transcript: turns,
            document: None,
            created_at: Utc::now(),
        }
    }

    fn render(ui: &UiSettings, snapshot: &SessionSnapshot, error: Option<&str>) -> String {
        render_chat_page(&ChatPage {
            ui,
            snapshot,
            error,
        })
        .unwrap()
    }

    #[test]
    fn given_panel_style_when_rendering_then_labels_turns_you_and_bot() {
        let ui = UiSettings {
            render_style: RenderStyle::Panel,
            ..UiSettings::default()
        };
        let snapshot = snapshot(vec![Message::user("hi"), Message::assistant("hello")]);

        let html = render(&ui, &snapshot, None);

        assert!(html.contains("<b>You:</b> hi"));
        assert!(html.contains("<b>Bot:</b> hello"));
        assert!(html.contains("#DCF8C6"));
        assert!(html.contains("Send Message"));
        assert!(!html.contains(r#"class="bubble"#));
    }

    #[test]
    fn given_bubble_style_when_rendering_then_uses_required_single_line_input() {
        let ui = UiSettings::default();
        let snapshot = snapshot(vec![Message::user("hi")]);

        let html = render(&ui, &snapshot, None);

        assert!(html.contains(r#"class="bubble user""#));
        assert!(html.contains(r#"<input type="text" name="message""#));
        assert!(!html.contains("<textarea"));
        assert!(html.contains(r#"accept=".txt,.docx,.xlsx,.pdf""#));
    }

    #[test]
    fn given_markup_in_turn_and_error_when_rendering_then_escapes_it() {
        let ui = UiSettings::default();
        let snapshot = snapshot(vec![Message::user("<script>alert(1)</script>")]);

        let html = render(&ui, &snapshot, Some("<b>bad & broken</b>"));

        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;alert(1)"));
        assert!(html.contains("&lt;b&gt;bad &amp; broken"));
    }

    #[test]
    fn given_no_features_when_rendering_then_omits_feature_list() {
        let ui = UiSettings {
            features: Vec::new(),
            ..UiSettings::default()
        };

        let html = render(&ui, &snapshot(Vec::new()), None);

        assert!(!html.contains("Features:"));
        assert!(!html.contains("File content loaded"));
    }
}
