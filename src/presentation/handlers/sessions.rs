use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::ports::{FileLoader, LlmClient};
use crate::presentation::state::AppState;

use super::api_error::{ApiError, parse_session_id};
use super::dto::SessionResponse;

#[tracing::instrument(skip(state))]
pub async fn create_session_handler<F, L>(
    State(state): State<AppState<F, L>>,
) -> Result<impl IntoResponse, ApiError>
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let session_id = state.chat_service.create_session().await?;
    let snapshot = state.chat_service.snapshot(session_id).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(&snapshot))))
}

#[tracing::instrument(skip(state))]
pub async fn get_session_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let session_id = parse_session_id(&session_id)?;
    let snapshot = state.chat_service.snapshot(session_id).await?;

    Ok(Json(SessionResponse::from(&snapshot)))
}

#[tracing::instrument(skip(state))]
pub async fn reset_session_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let session_id = parse_session_id(&session_id)?;
    state.chat_service.reset_session(session_id).await?;
    let snapshot = state.chat_service.snapshot(session_id).await?;

    Ok(Json(SessionResponse::from(&snapshot)))
}

#[tracing::instrument(skip(state))]
pub async fn delete_session_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let session_id = parse_session_id(&session_id)?;
    state.chat_service.delete_session(session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
