#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use docchat::application::ports::{LlmClient, LlmClientError, SessionRepository};
use docchat::application::services::{ChatService, ChatServiceConfig, DocumentService};
use docchat::domain::{EmptyMessagePolicy, PromptMessage};
use docchat::infrastructure::persistence::InMemorySessionRepository;
use docchat::infrastructure::text_processing::CompositeFileLoader;
use docchat::presentation::config::UiSettings;
use docchat::presentation::{AppState, create_router};
use zip::write::SimpleFileOptions;

/// Records every prompt it receives and answers with a fixed reply or error.
pub struct RecordingLlmClient {
    reply: Option<String>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<Vec<PromptMessage>>>,
}

impl RecordingLlmClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps this long inside every completion before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn last_prompt(&self) -> Vec<PromptMessage> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingLlmClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmClientError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(LlmClientError::ApiRequestFailed(
                "HTTP 401 Unauthorized: invalid api key".to_string(),
            )),
        }
    }
}

pub struct TestContext {
    pub llm_client: Arc<RecordingLlmClient>,
    pub sessions: Arc<dyn SessionRepository>,
    pub chat_service: Arc<ChatService<RecordingLlmClient>>,
    pub document_service: Arc<DocumentService<CompositeFileLoader>>,
}

pub fn test_context(llm_client: RecordingLlmClient, policy: EmptyMessagePolicy) -> TestContext {
    let llm_client = Arc::new(llm_client);
    let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::new());
    let chat_service = Arc::new(ChatService::new(
        Arc::clone(&llm_client),
        Arc::clone(&sessions),
        ChatServiceConfig {
            empty_message_policy: policy,
            ..ChatServiceConfig::default()
        },
    ));
    let document_service = Arc::new(DocumentService::new(
        Arc::new(CompositeFileLoader::with_default_adapters()),
        Arc::clone(&sessions),
    ));

    TestContext {
        llm_client,
        sessions,
        chat_service,
        document_service,
    }
}

pub fn test_app(context: &TestContext, ui: UiSettings, max_upload_bytes: usize) -> axum::Router {
    create_router(AppState {
        chat_service: Arc::clone(&context.chat_service),
        document_service: Arc::clone(&context.document_service),
        ui,
        max_upload_bytes,
    })
}

/// Builds an in-memory zip archive from (path, contents) pairs.
pub fn zip_package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| {
            if p.is_empty() {
                "<w:p/>".to_string()
            } else {
                format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>")
            }
        })
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );
    zip_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("word/document.xml", document.as_str()),
    ])
}

/// Workbook whose first sheet is `sheet_xml`, reached through the workbook
/// relationships. A decoy `sheet1.xml` holds the second sheet.
pub fn xlsx_bytes(shared_strings: &[&str], sheet_xml: &str) -> Vec<u8> {
    let items: String = shared_strings
        .iter()
        .map(|s| format!("<si><t>{s}</t></si>"))
        .collect();
    let sst = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{n}" uniqueCount="{n}">{items}</sst>"#,
        n = shared_strings.len()
    );
    let workbook = r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Parts" sheetId="1" r:id="rId7"/><sheet name="Other" sheetId="2" r:id="rId8"/></sheets></workbook>"#;
    let rels = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/parts.xml"/></Relationships>"#;
    let decoy = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>wrong sheet</t></is></c></row></sheetData></worksheet>"#;

    zip_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", rels),
        ("xl/sharedStrings.xml", sst.as_str()),
        ("xl/worksheets/parts.xml", sheet_xml),
        ("xl/worksheets/sheet1.xml", decoy),
    ])
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;
