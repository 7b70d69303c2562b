use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use crate::application::ports::{FileLoader, LlmClient};
use crate::presentation::state::AppState;

use super::api_error::{ApiError, parse_session_id};
use super::dto::{SubmitRequest, SubmitResponse};

/// Provider failures still answer 200: the error turn is part of the transcript.
#[tracing::instrument(skip(state, request))]
pub async fn submit_message_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let session_id = parse_session_id(&session_id)?;
    let outcome = state
        .chat_service
        .submit(session_id, &request.message)
        .await?;

    if !outcome.is_success() {
        tracing::warn!("Replying with provider error turn");
    }

    Ok(Json(SubmitResponse::from(&outcome)))
}
