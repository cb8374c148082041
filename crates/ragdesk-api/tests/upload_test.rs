//! Upload endpoint integration tests.
//!
//! Run with: `cargo test -p ragdesk-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{setup_test_app, setup_test_app_with, DOCUMENT_ID, STORE_NAME};
use ragdesk_core::NewDocument;
use ragdesk_db::DocumentRepository;
use serde_json::Value;

const UPLOAD_PATH: &str = "/api/embeddings/upload";

fn file_form(name: &str, mime: &str, contents: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(contents.to_vec())
            .file_name(name.to_string())
            .mime_type(mime.to_string()),
    )
}

#[tokio::test]
async fn text_upload_is_stored_and_recorded() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.txt", "text/plain", b"hello world"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "File 'notes.txt' uploaded successfully");

    let uploads = app.store.uploads();
    assert_eq!(uploads.len(), 1);
    let upload = &uploads[0];
    assert_eq!(upload.request.store_name, STORE_NAME);
    assert_eq!(upload.request.display_name, "notes.txt");
    assert_eq!(upload.request.mime_type, "text/plain");
    assert_eq!(upload.contents, b"hello world");
    assert_eq!(upload.request.custom_metadata.len(), 1);
    assert_eq!(upload.request.custom_metadata[0].key, "original_name");
    assert_eq!(upload.request.custom_metadata[0].string_value, "notes.txt");

    let row = app.documents.get(DOCUMENT_ID).await.unwrap().unwrap();
    assert_eq!(row.name, "notes.txt");
    assert_eq!(row.file_type, "text/plain");
    assert_eq!(row.size, "11 Bytes");

    assert_eq!(app.scratch_files(), 0);
}

#[tokio::test]
async fn declared_content_type_parameters_are_stripped() {
    let app = setup_test_app().await;

    app.client()
        .post(UPLOAD_PATH)
        .multipart(file_form("data.csv", "Text/CSV; charset=utf-8", b"a,b\n1,2\n"))
        .await
        .assert_status_ok();

    let row = app.documents.get(DOCUMENT_ID).await.unwrap().unwrap();
    assert_eq!(row.file_type, "text/csv");
}

#[tokio::test]
async fn image_is_summarized_before_upload() {
    let app = setup_test_app().await;
    let png = [0x89, b'P', b'N', b'G', 1, 2, 3];

    app.client()
        .post(UPLOAD_PATH)
        .multipart(file_form("cat.png", "image/png", &png))
        .await
        .assert_status_ok();

    let calls = app.vision.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, png.to_vec());
    assert_eq!(calls[0].1, "image/png");

    let uploads = app.store.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].request.display_name, "cat-vision-summary.md");
    assert_eq!(uploads[0].request.mime_type, "text/markdown");
    assert_eq!(uploads[0].request.custom_metadata[0].string_value, "cat.png");
    let markdown = String::from_utf8(uploads[0].contents.clone()).unwrap();
    assert!(markdown.starts_with("# Image Document: cat.png\n\n## High-level Summary"));
    assert!(markdown.contains("- Original MIME type: image/png"));

    // The row describes the original image, not the summary.
    let row = app.documents.get(DOCUMENT_ID).await.unwrap().unwrap();
    assert_eq!(row.name, "cat.png");
    assert_eq!(row.file_type, "image/png");
    assert_eq!(row.size, "7 Bytes");

    assert_eq!(app.scratch_files(), 0);
}

#[tokio::test]
async fn vision_failure_uploads_nothing() {
    let app = setup_test_app().await;
    *app.vision.summary.lock().unwrap() = None;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("cat.jpg", "image/jpeg", b"jpeg"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to process image. Please try again.");
    assert!(app.store.uploads().is_empty());
    assert!(app.documents.is_empty().await);
    assert_eq!(app.scratch_files(), 0);
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(MultipartForm::new().add_text("note", "no file here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn empty_file_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("empty.txt", "text/plain", b""))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "File is empty");
}

#[tokio::test]
async fn traversal_name_is_rejected_before_staging() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes..txt", "text/plain", b"secret"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid file name");
    assert!(app.store.uploads().is_empty());
    assert!(!app.scratch_dir.exists() || app.scratch_files() == 0);
}

#[tokio::test]
async fn relative_path_name_is_rejected_without_upload() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("../../etc/passwd", "text/plain", b"root:x:0:0"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid file name");
    assert!(app.store.uploads().is_empty());
    assert!(app.documents.is_empty().await);
    assert!(!app.scratch_dir.exists() || app.scratch_files() == 0);
}

#[tokio::test]
async fn missing_store_name_is_a_configuration_error() {
    let app = setup_test_app_with(|config| config.google.file_search_store_name = None).await;

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.txt", "text/plain", b"hello"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Failed to initialize file storage. Please check your configuration."
    );
    assert!(app.store.uploads().is_empty());
}

#[tokio::test]
async fn operation_error_is_reported() {
    let app = setup_test_app().await;
    app.store
        .configure(|b| b.operation_error = Some("Unsupported file format".to_string()));

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.txt", "text/plain", b"hello"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "File upload failed: Unsupported file format");
    assert!(app.documents.is_empty().await);
    assert_eq!(app.scratch_files(), 0);
}

#[tokio::test]
async fn upload_transport_failure_is_reported() {
    let app = setup_test_app().await;
    app.store.configure(|b| b.upload_fails = true);

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.txt", "text/plain", b"hello"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to upload file directly to search store");
    assert_eq!(app.scratch_files(), 0);
}

#[tokio::test]
async fn missing_document_id_is_distinct_failure() {
    let app = setup_test_app().await;
    app.store.configure(|b| b.document_name = None);

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.txt", "text/plain", b"hello"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "File upload completed but document ID is missing");
    assert_eq!(body["code"], "ORPHANED_REMOTE_DOCUMENT");
    assert!(app.documents.is_empty().await);
}

#[tokio::test]
async fn metadata_failure_reports_inconsistency() {
    let app = setup_test_app().await;
    app.documents
        .insert(NewDocument {
            id: DOCUMENT_ID.to_string(),
            name: "earlier.txt".to_string(),
            file_type: "text/plain".to_string(),
            size: "1 Bytes".to_string(),
        })
        .await
        .unwrap();

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.txt", "text/plain", b"hello"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "File uploaded but failed to save metadata. Please contact support."
    );
    // The remote document exists; nothing is rolled back.
    assert_eq!(app.store.uploads().len(), 1);
    assert!(app.store.deletes().is_empty());
}

#[tokio::test]
async fn slow_operation_is_polled_until_done() {
    let app = setup_test_app().await;
    app.store.configure(|b| b.pending_polls = 3);

    app.client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.md", "text/markdown", b"# notes"))
        .await
        .assert_status_ok();

    assert_eq!(
        app.store.polls.load(std::sync::atomic::Ordering::SeqCst),
        3
    );
}

#[tokio::test]
async fn shutdown_interrupts_the_wait() {
    let app = setup_test_app().await;
    app.store.configure(|b| b.pending_polls = u32::MAX);
    app.state.shutdown.cancel();

    let response = app
        .client()
        .post(UPLOAD_PATH)
        .multipart(file_form("notes.txt", "text/plain", b"hello"))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "File upload was interrupted because the server is shutting down"
    );
    assert_eq!(app.scratch_files(), 0);
}
