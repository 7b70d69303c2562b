use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, FileKind};

use super::ooxml::{OoxmlPackage, resolve_reference, xml_error};

const DOCUMENT_PART: &str = "word/document.xml";

/// Joins the body paragraphs of a Word document with newlines.
///
/// Only paragraphs that are direct children of the body count, so table cells
/// and text boxes are skipped. Inside a paragraph, run text is kept along with
/// tabs and line breaks.
pub struct DocxAdapter;

#[async_trait]
impl FileLoader for DocxAdapter {
    #[tracing::instrument(skip(self, data), fields(filename = %document.filename))]
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.kind != Some(FileKind::Docx) {
            return Err(FileLoaderError::UnsupportedContentType(document.extension()));
        }

        let xml = OoxmlPackage::open(data)?.require_part(DOCUMENT_PART)?;
        let paragraphs = body_paragraphs(&xml)?;
        tracing::debug!(paragraph_count = paragraphs.len(), "DOCX text extraction complete");

        Ok(paragraphs.join("\n"))
    }
}

#[derive(Default)]
struct ParagraphCollector {
    stack: Vec<Vec<u8>>,
    /// Stack depth of the open body paragraph and its text so far.
    current: Option<(usize, String)>,
    paragraphs: Vec<String>,
}

impl ParagraphCollector {
    fn parent_is_body(&self) -> bool {
        self.stack.last().is_some_and(|n| n == b"body")
    }

    /// True while the innermost open element sits in the body paragraph itself
    /// rather than in a paragraph nested inside it.
    fn in_own_content(&self) -> bool {
        match &self.current {
            Some((depth, _)) => !self.stack[depth + 1..].iter().any(|n| n == b"p"),
            None => false,
        }
    }

    fn start(&mut self, name: Vec<u8>) {
        if name == b"p" && self.current.is_none() && self.parent_is_body() {
            self.current = Some((self.stack.len(), String::new()));
        }
        self.stack.push(name);
    }

    fn empty(&mut self, name: &[u8]) {
        if self.current.is_none() {
            if name == b"p" && self.parent_is_body() {
                self.paragraphs.push(String::new());
            }
            return;
        }

        let in_run = self.stack.last().is_some_and(|n| n == b"r");
        if !in_run || !self.in_own_content() {
            return;
        }
        if let Some((_, text)) = self.current.as_mut() {
            match name {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            }
        }
    }

    fn text(&mut self, value: &str) {
        let in_text = self.stack.last().is_some_and(|n| n == b"t");
        if !in_text || !self.in_own_content() {
            return;
        }
        if let Some((_, text)) = self.current.as_mut() {
            text.push_str(value);
        }
    }

    fn end(&mut self) {
        self.stack.pop();
        if self
            .current
            .as_ref()
            .is_some_and(|(depth, _)| *depth == self.stack.len())
        {
            if let Some((_, text)) = self.current.take() {
                self.paragraphs.push(text);
            }
        }
    }
}

fn body_paragraphs(xml: &str) -> Result<Vec<String>, FileLoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut collector = ParagraphCollector::default();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => collector.start(e.local_name().as_ref().to_vec()),
            Event::Empty(e) => collector.empty(e.local_name().as_ref()),
            Event::Text(t) => collector.text(&t.decode().map_err(xml_error)?),
            Event::GeneralRef(r) => collector.text(&resolve_reference(&r)?),
            Event::End(_) => collector.end(),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(collector.paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn wrap(body: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:document {NS}><w:body>{body}</w:body></w:document>"#)
    }

    #[test]
    fn given_runs_split_across_paragraph_when_collecting_then_concatenates_runs() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>Resistor </w:t></w:r><w:r><w:t>R1</w:t></w:r></w:p><w:p><w:r><w:t>100ohm</w:t></w:r></w:p>"#,
        );

        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["Resistor R1", "100ohm"]);
    }

    #[test]
    fn given_empty_paragraph_when_collecting_then_keeps_blank_line() {
        let xml = wrap(r#"<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p/><w:p></w:p><w:p><w:r><w:t>b</w:t></w:r></w:p>"#);

        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["a", "", "", "b"]);
    }

    #[test]
    fn given_tab_break_and_entities_when_collecting_then_renders_them() {
        let xml = wrap(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>C&amp;K</w:t><w:tab/><w:t>SW</w:t><w:br/><w:t>&#916;T</w:t></w:r></w:p>"#,
        );

        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["C&K\tSW\n\u{394}T"]);
    }

    #[test]
    fn given_table_paragraphs_when_collecting_then_skips_them() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>before</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );

        assert_eq!(body_paragraphs(&xml).unwrap(), vec!["before", "after"]);
    }
}
