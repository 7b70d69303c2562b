use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{FileLoader, LlmClient};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    chat_page_handler, create_session_handler, delete_session_handler, get_session_handler,
    health_handler, index_handler, page_remove_document_handler, page_reset_handler,
    page_submit_handler, page_upload_handler, remove_document_handler, reset_session_handler,
    submit_message_handler, upload_document_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<F, L>(state: AppState<F, L>) -> Router
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    let api = Router::new()
        .route("/api/v1/sessions", post(create_session_handler::<F, L>))
        .route(
            "/api/v1/sessions/{session_id}",
            get(get_session_handler::<F, L>).delete(delete_session_handler::<F, L>),
        )
        .route(
            "/api/v1/sessions/{session_id}/reset",
            post(reset_session_handler::<F, L>),
        )
        .route(
            "/api/v1/sessions/{session_id}/document",
            post(upload_document_handler::<F, L>).delete(remove_document_handler::<F, L>),
        )
        .route(
            "/api/v1/sessions/{session_id}/messages",
            post(submit_message_handler::<F, L>),
        );

    let pages = Router::new()
        .route("/", get(index_handler::<F, L>))
        .route("/chat/{session_id}", get(chat_page_handler::<F, L>))
        .route(
            "/chat/{session_id}/messages",
            post(page_submit_handler::<F, L>),
        )
        .route(
            "/chat/{session_id}/document",
            post(page_upload_handler::<F, L>),
        )
        .route(
            "/chat/{session_id}/document/remove",
            post(page_remove_document_handler::<F, L>),
        )
        .route("/chat/{session_id}/reset", post(page_reset_handler::<F, L>));

    Router::new()
        .route("/health", get(health_handler::<F, L>))
        .merge(api)
        .merge(pages)
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
