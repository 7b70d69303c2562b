use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;
use tempfile::NamedTempFile;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, FileKind};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Concatenates per-page text in page order. A page that yields no text, or
/// fails to extract, contributes nothing.
pub struct PdfAdapter {
    timeout: Duration,
}

impl Default for PdfAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAdapter {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn failed(context: &str, error: impl std::fmt::Display) -> FileLoaderError {
    FileLoaderError::ExtractionFailed(format!("{context}: {error}"))
}

/// The parser reads from disk, so the upload is spooled to a temp file that
/// lives until extraction finishes.
fn spool(data: &[u8]) -> Result<NamedTempFile, FileLoaderError> {
    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| failed("failed to create temp file", e))?;
    file.write_all(data)
        .map_err(|e| failed("failed to write temp file", e))?;
    Ok(file)
}

fn read_pages(path: &Path) -> Result<Vec<String>, FileLoaderError> {
    let mut pdf = PdfDocument::open(path).map_err(|e| failed("failed to parse PDF", e))?;
    let page_count = pdf
        .page_count()
        .map_err(|e| failed("failed to read page count", e))?;

    Ok((0..page_count)
        .map(|page| {
            pdf.extract_text(page).unwrap_or_else(|e| {
                tracing::warn!(page = page + 1, error = %e, "PDF page yielded no text");
                String::new()
            })
        })
        .collect())
}

#[async_trait]
impl FileLoader for PdfAdapter {
    #[tracing::instrument(skip(self, data), fields(filename = %document.filename))]
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.kind != Some(FileKind::Pdf) {
            return Err(FileLoaderError::UnsupportedContentType(document.extension()));
        }

        let file = spool(data)?;
        let extraction = tokio::task::spawn_blocking(move || read_pages(file.path()));

        let pages = tokio::time::timeout(self.timeout, extraction)
            .await
            .map_err(|_| FileLoaderError::ExtractionFailed("PDF extraction timed out".to_string()))?
            .map_err(|e| failed("extraction task failed", e))??;

        let blank_pages = pages.iter().filter(|p| p.trim().is_empty()).count();
        tracing::info!(
            page_count = pages.len(),
            blank_pages,
            "PDF text extraction complete"
        );

        Ok(pages.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal uncompressed PDF with one Helvetica text line per page.
    fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect();
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];
        for (i, text) in pages.iter().enumerate() {
            let stream = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (n, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", n + 1).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    #[tokio::test]
    async fn given_two_page_pdf_when_extracting_then_page_texts_joined_without_separator() {
        let data = pdf_with_pages(&["Hello", "World"]);
        let spooled = spool(&data).unwrap();
        let pages = read_pages(spooled.path()).unwrap();
        let document = Document::new("two-pages.pdf".to_string(), data.len() as u64);

        let text = PdfAdapter::new().extract_text(&data, &document).await.unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Hello"));
        assert!(pages[1].contains("World"));
        assert_eq!(text, pages.concat());
        assert_eq!(text.split_whitespace().collect::<String>(), "HelloWorld");
    }
}
