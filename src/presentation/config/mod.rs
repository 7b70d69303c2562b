mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChatSettings, LlmSettings, LoggingSettings, RenderStyle, ServerSettings, Settings, UiSettings,
};
