use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::ports::{FileLoader, FileLoaderError, RepositoryError, SessionRepository};
use crate::domain::{Document, FileKind, SessionId, UNSUPPORTED_FILE_TYPE, UploadedDocument};

pub struct DocumentService<F>
where
    F: FileLoader,
{
    file_loader: Arc<F>,
    sessions: Arc<dyn SessionRepository>,
}

impl<F> DocumentService<F>
where
    F: FileLoader,
{
    pub fn new(file_loader: Arc<F>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            file_loader,
            sessions,
        }
    }

    /// Extracts text from an upload. Unrecognised kinds yield the
    /// "Unsupported file type." text instead of an error.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn extract(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<UploadedDocument, FileLoaderError> {
        let document = Document::new(filename.to_string(), data.len() as u64);

        let text = match self.file_loader.extract_text(data, &document).await {
            Ok(text) => text,
            Err(FileLoaderError::UnsupportedContentType(extension)) => {
                tracing::warn!(extension = %extension, "Unsupported file type uploaded");
                UNSUPPORTED_FILE_TYPE.to_string()
            }
            Err(e) => return Err(e),
        };

        Ok(UploadedDocument::new(document, text))
    }

    /// Replaces the session's document. A failed extraction still discards the
    /// previous document.
    #[tracing::instrument(skip(self, data), fields(session_id = %session_id, bytes = data.len()))]
    pub async fn upload(
        &self,
        session_id: SessionId,
        filename: &str,
        data: &[u8],
    ) -> Result<DocumentSummary, DocumentServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .map_err(|e| not_found(session_id, e))?;
        let mut session = handle.lock().await;
        session.clear_document();

        let uploaded = self.extract(filename, data).await.map_err(|e| {
            tracing::error!(error = %e, "Document extraction failed");
            DocumentServiceError::Extraction(e)
        })?;

        let summary = DocumentSummary::from(&uploaded);
        tracing::info!(
            filename = %summary.filename,
            supported = summary.supported,
            extracted_chars = summary.extracted_chars,
            "Document loaded"
        );
        session.attach_document(uploaded);

        Ok(summary)
    }

    /// Clears the session's document. Returns whether one was attached.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, session_id: SessionId) -> Result<bool, DocumentServiceError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .map_err(|e| not_found(session_id, e))?;
        let removed = handle.lock().await.clear_document().is_some();
        Ok(removed)
    }
}

fn not_found(session_id: SessionId, error: RepositoryError) -> DocumentServiceError {
    match error {
        RepositoryError::NotFound(_) => DocumentServiceError::SessionNotFound(session_id),
        other => DocumentServiceError::Repository(other),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub filename: String,
    pub kind: Option<FileKind>,
    pub size_bytes: u64,
    pub supported: bool,
    pub extracted_chars: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&UploadedDocument> for DocumentSummary {
    fn from(uploaded: &UploadedDocument) -> Self {
        Self {
            filename: uploaded.document.filename.clone(),
            kind: uploaded.document.kind,
            size_bytes: uploaded.document.size_bytes,
            supported: uploaded.is_supported(),
            extracted_chars: uploaded.text.chars().count(),
            uploaded_at: uploaded.uploaded_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentServiceError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("file loading: {0}")]
    Extraction(#[from] FileLoaderError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
