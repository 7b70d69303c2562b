mod helpers;

use docchat::application::ports::FileLoaderError;
use docchat::application::services::DocumentServiceError;
use docchat::domain::{EmptyMessagePolicy, FileKind, MessageRole, SessionId};

use helpers::{RecordingLlmClient, docx_bytes, test_context};

fn context() -> helpers::TestContext {
    test_context(
        RecordingLlmClient::replying("ok"),
        EmptyMessagePolicy::RejectBlank,
    )
}

#[tokio::test]
async fn given_txt_upload_when_uploading_then_summary_describes_document() {
    let ctx = context();
    let session_id = ctx.chat_service.create_session().await.unwrap();

    let summary = ctx
        .document_service
        .upload(session_id, "bom.txt", b"Resistor R1 100ohm")
        .await
        .unwrap();

    assert_eq!(summary.filename, "bom.txt");
    assert_eq!(summary.kind, Some(FileKind::Text));
    assert_eq!(summary.size_bytes, 18);
    assert!(summary.supported);
    assert_eq!(summary.extracted_chars, 18);

    let snapshot = ctx.chat_service.snapshot(session_id).await.unwrap();
    assert_eq!(snapshot.document, Some(summary));
}

#[tokio::test]
async fn given_docx_upload_when_asking_then_paragraphs_reach_the_prompt() {
    let ctx = context();
    let session_id = ctx.chat_service.create_session().await.unwrap();
    let data = docx_bytes(&["U1 is an LM317", "R5 sets the output"]);

    ctx.document_service
        .upload(session_id, "design.docx", &data)
        .await
        .unwrap();
    ctx.chat_service
        .submit(session_id, "what is U1?")
        .await
        .unwrap();

    let prompt = ctx.llm_client.last_prompt();
    assert_eq!(prompt[0].role, MessageRole::System);
    assert_eq!(
        prompt[0].content,
        "The following is the content of the uploaded file:\nU1 is an LM317\nR5 sets the output\n\n"
    );
}

#[tokio::test]
async fn given_unsupported_extension_when_uploading_then_placeholder_becomes_context() {
    let ctx = context();
    let session_id = ctx.chat_service.create_session().await.unwrap();

    let summary = ctx
        .document_service
        .upload(session_id, "board.png", b"\x89PNG\r\n")
        .await
        .unwrap();

    assert!(!summary.supported);
    assert_eq!(summary.kind, None);

    ctx.chat_service.submit(session_id, "hi").await.unwrap();
    let prompt = ctx.llm_client.last_prompt();
    assert_eq!(prompt[0].role, MessageRole::System);
    assert!(prompt[0].content.contains("Unsupported file type."));
}

#[tokio::test]
async fn given_unsupported_extension_when_extracting_then_text_is_placeholder() {
    let ctx = context();

    let uploaded = ctx
        .document_service
        .extract("archive.zip", b"PK")
        .await
        .unwrap();

    assert_eq!(uploaded.text, "Unsupported file type.");
    assert!(!uploaded.is_supported());
}

#[tokio::test]
async fn given_empty_txt_when_asking_then_no_system_turn() {
    let ctx = context();
    let session_id = ctx.chat_service.create_session().await.unwrap();

    ctx.document_service
        .upload(session_id, "empty.txt", b"")
        .await
        .unwrap();
    ctx.chat_service.submit(session_id, "hi").await.unwrap();

    assert!(
        ctx.llm_client
            .last_prompt()
            .iter()
            .all(|m| m.role != MessageRole::System)
    );
}

#[tokio::test]
async fn given_attached_document_when_new_upload_fails_then_previous_document_discarded() {
    let ctx = context();
    let session_id = ctx.chat_service.create_session().await.unwrap();
    ctx.document_service
        .upload(session_id, "first.txt", b"first file")
        .await
        .unwrap();

    let result = ctx
        .document_service
        .upload(session_id, "broken.docx", b"not a zip")
        .await;

    assert!(matches!(
        result,
        Err(DocumentServiceError::Extraction(
            FileLoaderError::ExtractionFailed(_)
        ))
    ));
    let snapshot = ctx.chat_service.snapshot(session_id).await.unwrap();
    assert!(snapshot.document.is_none());
}

#[tokio::test]
async fn given_attached_document_when_uploading_another_then_replaced() {
    let ctx = context();
    let session_id = ctx.chat_service.create_session().await.unwrap();
    ctx.document_service
        .upload(session_id, "first.txt", b"first file")
        .await
        .unwrap();

    ctx.document_service
        .upload(session_id, "second.txt", b"second file")
        .await
        .unwrap();
    ctx.chat_service.submit(session_id, "hi").await.unwrap();

    let system = &ctx.llm_client.last_prompt()[0];
    assert!(system.content.contains("second file"));
    assert!(!system.content.contains("first file"));
}

#[tokio::test]
async fn given_attached_document_when_removed_then_context_no_longer_sent() {
    let ctx = context();
    let session_id = ctx.chat_service.create_session().await.unwrap();
    ctx.document_service
        .upload(session_id, "notes.txt", b"notes")
        .await
        .unwrap();

    let removed = ctx.document_service.remove(session_id).await.unwrap();
    let removed_again = ctx.document_service.remove(session_id).await.unwrap();
    ctx.chat_service.submit(session_id, "hi").await.unwrap();

    assert!(removed);
    assert!(!removed_again);
    assert_eq!(ctx.llm_client.last_prompt().len(), 1);
}

#[tokio::test]
async fn given_unknown_session_when_uploading_then_session_not_found() {
    let ctx = context();

    let result = ctx
        .document_service
        .upload(SessionId::new(), "a.txt", b"text")
        .await;

    assert!(matches!(
        result,
        Err(DocumentServiceError::SessionNotFound(_))
    ));
}
