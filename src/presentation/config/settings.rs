use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::domain::EmptyMessagePolicy;
use crate::infrastructure::observability::DEFAULT_LOG_FILTER;

use super::Environment;

/// Application settings.
///
/// Sources, later ones winning: `appsettings.toml`, `appsettings.{environment}.toml`
/// (both optional), then `APP_`-prefixed environment variables using `__` between
/// nested keys, e.g. `APP_LLM__API_KEY`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub chat: ChatSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("appsettings").required(false))
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_mb: 25,
        }
    }
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Name shown in error turns, e.g. "OpenAI API Error: ...".
    pub provider_label: String,
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub max_tokens: usize,
    pub request_timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider_label: "OpenAI".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            chat_model: "gpt-4.1".to_string(),
            max_tokens: 1024,
            request_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub history_window: usize,
    pub empty_message_policy: EmptyMessagePolicy,
    /// Sessions untouched for this long are discarded. Zero keeps them forever.
    pub session_idle_minutes: u64,
    pub session_sweep_seconds: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            history_window: 10,
            empty_message_policy: EmptyMessagePolicy::RejectBlank,
            session_idle_minutes: 60,
            session_sweep_seconds: 60,
        }
    }
}

impl ChatSettings {
    pub fn session_idle_timeout(&self) -> Option<chrono::Duration> {
        match self.session_idle_minutes {
            0 => None,
            minutes => i64::try_from(minutes).ok().map(chrono::Duration::minutes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// One bubble per turn with a press-enter input.
    #[default]
    Bubbles,
    /// Fixed-height scroll panel with a text area and a send button.
    Panel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub title: String,
    pub chat_heading: String,
    pub features: Vec<String>,
    pub render_style: RenderStyle,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            title: "FindMyComponent Chatbot".to_string(),
            chat_heading: "Chat with IC Part Finder (or Your File)".to_string(),
            features: vec![
                "Chatbot for general questions".to_string(),
                "Chat about content in uploaded files (txt, Word, Excel, PDF)".to_string(),
                "Search Components used in board and systems (IC, Passive, Thermal, Connectors..)"
                    .to_string(),
                "Find alternatives by Form, Fit, Function (FFF)".to_string(),
            ],
            render_style: RenderStyle::Bubbles,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_FILTER.to_string(),
            enable_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_sources_when_defaulting_then_matches_documented_values() {
        let settings = Settings::default();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.llm.chat_model, "gpt-4.1");
        assert_eq!(settings.llm.max_tokens, 1024);
        assert_eq!(settings.chat.history_window, 10);
        assert_eq!(settings.chat.empty_message_policy, EmptyMessagePolicy::RejectBlank);
        assert_eq!(settings.ui.render_style, RenderStyle::Bubbles);
        assert_eq!(settings.server.max_upload_bytes(), 25 * 1024 * 1024);
        assert_eq!(
            settings.chat.session_idle_timeout(),
            Some(chrono::Duration::minutes(60))
        );
    }

    #[test]
    fn given_zero_idle_minutes_when_reading_timeout_then_sessions_never_expire() {
        let chat = ChatSettings {
            session_idle_minutes: 0,
            ..ChatSettings::default()
        };

        assert_eq!(chat.session_idle_timeout(), None);
    }

    #[test]
    fn given_partial_toml_when_deserializing_then_fills_missing_fields_with_defaults() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [chat]
                empty_message_policy = "reject_empty"

                [ui]
                render_style = "panel"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.chat.empty_message_policy, EmptyMessagePolicy::RejectEmpty);
        assert_eq!(settings.chat.history_window, 10);
        assert_eq!(settings.ui.render_style, RenderStyle::Panel);
        assert_eq!(settings.llm.base_url, "https://api.openai.com/v1");
    }
}
