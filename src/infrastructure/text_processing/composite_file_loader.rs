use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, FileKind};

use super::{DocxAdapter, PdfAdapter, PlainTextAdapter, XlsxAdapter};

/// Dispatches extraction on the document's file kind.
pub struct CompositeFileLoader {
    adapters: HashMap<FileKind, Arc<dyn FileLoader>>,
}

impl CompositeFileLoader {
    pub fn new(adapters: Vec<(FileKind, Arc<dyn FileLoader>)>) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
        }
    }

    /// Loader with an adapter for every supported kind.
    pub fn with_default_adapters() -> Self {
        let text: Arc<dyn FileLoader> = Arc::new(PlainTextAdapter);
        let docx: Arc<dyn FileLoader> = Arc::new(DocxAdapter);
        let xlsx: Arc<dyn FileLoader> = Arc::new(XlsxAdapter);
        let pdf: Arc<dyn FileLoader> = Arc::new(PdfAdapter::new());

        Self::new(vec![
            (FileKind::Text, text),
            (FileKind::Docx, docx),
            (FileKind::Xlsx, xlsx),
            (FileKind::Pdf, pdf),
        ])
    }
}

#[async_trait]
impl FileLoader for CompositeFileLoader {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        let adapter = document
            .kind
            .and_then(|kind| self.adapters.get(&kind))
            .ok_or_else(|| FileLoaderError::UnsupportedContentType(document.extension()))?;

        adapter.extract_text(data, document).await
    }
}
