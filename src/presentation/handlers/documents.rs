use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::{FileLoader, LlmClient};
use crate::presentation::state::AppState;

use super::api_error::{ApiError, parse_session_id};
use super::dto::DocumentView;

const UPLOAD_FIELD: &str = "file";

#[derive(Serialize)]
pub struct RemoveDocumentResponse {
    pub removed: bool,
}

/// Reads the `file` field of a multipart upload as (filename, bytes).
pub async fn read_upload(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::BadRequest("No file uploaded".to_string())),
            Err(e) => return Err(multipart_error(e)),
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("unknown").to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        tracing::debug!(filename = %filename, bytes = data.len(), "File data received");

        return Ok((filename, data));
    }
}

fn multipart_error(error: axum::extract::multipart::MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(error.body_text())
    } else {
        ApiError::BadRequest(format!("Failed to read multipart: {}", error.body_text()))
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_document_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let session_id = parse_session_id(&session_id)?;
    let (filename, data) = read_upload(&mut multipart).await?;

    let summary = state
        .document_service
        .upload(session_id, &filename, &data)
        .await?;

    Ok(Json(DocumentView::from(&summary)))
}

#[tracing::instrument(skip(state))]
pub async fn remove_document_handler<F, L>(
    State(state): State<AppState<F, L>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: FileLoader + 'static,
    L: LlmClient + 'static,
{
    let session_id = parse_session_id(&session_id)?;
    let removed = state.document_service.remove(session_id).await?;

    Ok(Json(RemoveDocumentResponse { removed }))
}
