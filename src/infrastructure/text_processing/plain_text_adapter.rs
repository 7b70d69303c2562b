use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, FileKind};

/// Strict UTF-8 decoding; any invalid sequence fails the upload.
pub struct PlainTextAdapter;

#[async_trait]
impl FileLoader for PlainTextAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.kind != Some(FileKind::Text) {
            return Err(FileLoaderError::UnsupportedContentType(document.extension()));
        }

        std::str::from_utf8(data).map(str::to_owned).map_err(|e| {
            FileLoaderError::ExtractionFailed(format!(
                "{} is not valid UTF-8 (first bad byte at offset {})",
                document.filename,
                e.valid_up_to()
            ))
        })
    }
}
