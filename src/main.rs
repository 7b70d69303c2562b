use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use docchat::application::ports::SessionRepository;
use docchat::application::services::{ChatService, ChatServiceConfig, DocumentService};
use docchat::infrastructure::llm::OpenAiClient;
use docchat::infrastructure::observability::{TracingConfig, init_tracing};
use docchat::infrastructure::persistence::InMemorySessionRepository;
use docchat::infrastructure::text_processing::CompositeFileLoader;
use docchat::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(
        &TracingConfig::from_settings(&settings.logging, environment),
        settings.server.port,
    );

    if settings.llm.api_key.trim().is_empty() {
        anyhow::bail!("llm.api_key is not configured; set APP_LLM__API_KEY");
    }

    let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::new());
    let file_loader = Arc::new(CompositeFileLoader::with_default_adapters());
    let llm_client =
        Arc::new(OpenAiClient::new(&settings.llm).context("Failed to build LLM client")?);

    tracing::info!(
        model = %llm_client.model(),
        base_url = %settings.llm.base_url,
        max_tokens = settings.llm.max_tokens,
        history_window = settings.chat.history_window,
        empty_message_policy = ?settings.chat.empty_message_policy,
        render_style = ?settings.ui.render_style,
        "Chat backend configured"
    );

    let chat_service = Arc::new(ChatService::new(
        llm_client,
        Arc::clone(&sessions),
        ChatServiceConfig {
            history_window: settings.chat.history_window,
            empty_message_policy: settings.chat.empty_message_policy,
            provider_label: settings.llm.provider_label.clone(),
        },
    ));
    let document_service = Arc::new(DocumentService::new(file_loader, Arc::clone(&sessions)));

    if let Some(max_idle) = settings.chat.session_idle_timeout() {
        let chat_service = Arc::clone(&chat_service);
        let period = Duration::from_secs(settings.chat.session_sweep_seconds.max(1));
        tracing::info!(
            idle_minutes = settings.chat.session_idle_minutes,
            sweep_seconds = period.as_secs(),
            "Idle session expiry enabled"
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                chat_service.expire_idle_sessions(max_idle).await;
            }
        });
    }

    let state = AppState {
        chat_service,
        document_service,
        ui: settings.ui.clone(),
        max_upload_bytes: settings.server.max_upload_bytes(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
