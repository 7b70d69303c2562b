//! Browser-facing handlers. Each action mutates the session and redirects back
//! to the page, which redraws the whole transcript.

use axum::Form;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::application::ports::{FileLoader, LlmClient};
use crate::application::services::{ChatServiceError, DocumentServiceError};
use crate::domain::SessionId;
use crate::presentation::state::AppState;
use crate::presentation::views::{ChatPage, render_chat_page};

use super::api_error::{ApiError, parse_session_id};
use super::documents::read_upload;

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub message: String,
}

fn page_url(session_id: SessionId) -> String {
    format!("/chat/{}", session_id)
}

/// Unknown or malformed ids start over with a fresh session.
fn start_over() -> Response {
    Redirect::to("/").into_response()
}

#[tracing::instrument(skip(state))]
pub async fn index_handler<F, L>(State(state): State<AppState<F, L>>) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    match state.chat_service.create_session().await {
        Ok(session_id) => Redirect::to(&page_url(session_id)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[tracing::instrument(skip(state))]
pub async fn chat_page_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let Ok(session_id) = parse_session_id(&session_id) else {
        return start_over();
    };
    render(&state, session_id, None, StatusCode::OK).await
}

async fn render<F, L>(
    state: &AppState<F, L>,
    session_id: SessionId,
    error: Option<&str>,
    status: StatusCode,
) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    match state.chat_service.snapshot(session_id).await {
        Ok(snapshot) => {
            let page = ChatPage {
                ui: &state.ui,
                snapshot: &snapshot,
                error,
            };
            match render_chat_page(&page) {
                Ok(html) => (status, Html(html)).into_response(),
                Err(e) => ApiError::Internal(format!("page template: {e}")).into_response(),
            }
        }
        Err(ChatServiceError::SessionNotFound(_)) => start_over(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[tracing::instrument(skip(state, form))]
pub async fn page_submit_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let Ok(session_id) = parse_session_id(&session_id) else {
        return start_over();
    };

    match state.chat_service.submit(session_id, &form.message).await {
        Ok(_) | Err(ChatServiceError::EmptyMessage) => {
            Redirect::to(&page_url(session_id)).into_response()
        }
        Err(ChatServiceError::SessionNotFound(_)) => start_over(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn page_upload_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let Ok(session_id) = parse_session_id(&session_id) else {
        return start_over();
    };

    let (filename, data) = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            let status = e.status();
            let message = e.to_string();
            return render(&state, session_id, Some(&message), status).await;
        }
    };

    match state
        .document_service
        .upload(session_id, &filename, &data)
        .await
    {
        Ok(_) => Redirect::to(&page_url(session_id)).into_response(),
        Err(DocumentServiceError::SessionNotFound(_)) => start_over(),
        Err(e) => {
            let error = ApiError::from(e);
            let message = error.to_string();
            render(&state, session_id, Some(&message), error.status()).await
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn page_remove_document_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let Ok(session_id) = parse_session_id(&session_id) else {
        return start_over();
    };

    match state.document_service.remove(session_id).await {
        Ok(_) => Redirect::to(&page_url(session_id)).into_response(),
        Err(DocumentServiceError::SessionNotFound(_)) => start_over(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[tracing::instrument(skip(state))]
pub async fn page_reset_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
) -> Response
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let Ok(session_id) = parse_session_id(&session_id) else {
        return start_over();
    };

    match state.chat_service.reset_session(session_id).await {
        Ok(()) => Redirect::to(&page_url(session_id)).into_response(),
        Err(ChatServiceError::SessionNotFound(_)) => start_over(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
