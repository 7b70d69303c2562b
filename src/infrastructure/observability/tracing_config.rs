use crate::presentation::config::{Environment, LoggingSettings};

pub const DEFAULT_LOG_FILTER: &str = "info,docchat=debug,tower_http=debug";

/// Resolved logging options.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub default_filter: String,
}

impl TracingConfig {
    /// `LOG_FORMAT=json` forces JSON output regardless of settings.
    pub fn from_settings(logging: &LoggingSettings, environment: Environment) -> Self {
        let json_from_env = std::env::var("LOG_FORMAT")
            .is_ok_and(|v| v.eq_ignore_ascii_case("json"));

        Self {
            environment: environment.to_string(),
            json_format: logging.enable_json || json_from_env,
            default_filter: logging.level.clone(),
        }
    }
}
