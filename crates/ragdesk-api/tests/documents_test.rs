//! Listing, lookup, metadata edit and deletion integration tests.
//!
//! Run with: `cargo test -p ragdesk-api --test documents_test`

mod helpers;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use helpers::{setup_test_app, DeleteBehavior, TestApp, STORE_NAME};
use ragdesk_api::services::{deletion, listing};
use ragdesk_core::{DbError, DocumentMetadata, NewDocument, UpdateDocument};
use ragdesk_db::{DocumentRepository, InMemoryDocumentRepository};
use serde_json::{json, Value};
use tokio::sync::Notify;

async fn seed(app: &TestApp, id: &str, name: &str, mime: &str) {
    app.documents
        .insert(NewDocument {
            id: id.to_string(),
            name: name.to_string(),
            file_type: mime.to_string(),
            size: "1.5 KB".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn list_returns_rows_with_type_info() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "report.pdf", "application/pdf").await;

    let response = app.client().get("/api/documents").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "doc-1");
    assert_eq!(rows[0]["name"], "report.pdf");
    assert_eq!(rows[0]["type"], "application/pdf");
    assert_eq!(rows[0]["size"], "1.5 KB");
    assert_eq!(rows[0]["category"], "document");
    assert!(rows[0]["createdAt"].is_string());
    assert!(rows[0]["typeLabel"].is_string());
}

#[tokio::test]
async fn list_failure_yields_empty_array() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "report.pdf", "application/pdf").await;
    app.documents.set_unavailable(true);

    let response = app.client().get("/api/documents").await;

    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn listing_is_cached_until_a_mutation() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "a.txt", "text/plain").await;

    let first: Value = app.client().get("/api/documents").await.json();
    assert_eq!(first.as_array().unwrap().len(), 1);

    // Written behind the API's back: the cached listing does not see it.
    seed(&app, "doc-2", "b.txt", "text/plain").await;
    let cached: Value = app.client().get("/api/documents").await.json();
    assert_eq!(cached.as_array().unwrap().len(), 1);

    app.client()
        .delete("/api/documents/doc-1")
        .await
        .assert_status_ok();

    let refreshed: Value = app.client().get("/api/documents").await.json();
    let rows = refreshed.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "doc-2");
}

#[tokio::test]
async fn get_by_id() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "notes.md", "text/markdown").await;

    let response = app.client().get("/api/documents/doc-1").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "notes.md");
    assert_eq!(body["category"], "text");

    let missing = app.client().get("/api/documents/nope").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["error"], "Document not found");
}

#[tokio::test]
async fn rename_updates_row() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "notes.md", "text/markdown").await;

    let response = app
        .client()
        .patch("/api/documents/doc-1")
        .json(&json!({ "name": "meeting-notes.md" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "meeting-notes.md");
    assert_eq!(body["type"], "text/markdown");

    let row = app.documents.get("doc-1").await.unwrap().unwrap();
    assert_eq!(row.name, "meeting-notes.md");
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "notes.md", "text/markdown").await;

    let response = app
        .client()
        .patch("/api/documents/doc-1")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "At least one field must be provided for update");
}

#[tokio::test]
async fn rename_to_unsafe_name_is_rejected() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "notes.md", "text/markdown").await;

    let response = app
        .client()
        .patch("/api/documents/doc-1")
        .json(&json!({ "name": "../notes.md" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid file name");
}

#[tokio::test]
async fn update_unknown_document_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .patch("/api/documents/nope")
        .json(&json!({ "size": "2 KB" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_remote_and_local() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "a.txt", "text/plain").await;

    let response = app.client().delete("/api/documents/doc-1").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "success": true, "message": "File deleted successfully" }));
    assert_eq!(
        app.store.deletes(),
        vec![(STORE_NAME.to_string(), "doc-1".to_string())]
    );
    assert!(app.documents.get("doc-1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_tolerates_missing_remote_document() {
    let app = setup_test_app().await;
    app.store.configure(|b| b.delete = DeleteBehavior::NotFound);
    seed(&app, "doc-1", "a.txt", "text/plain").await;

    let response = app.client().delete("/api/documents/doc-1").await;

    response.assert_status_ok();
    assert!(app.documents.get("doc-1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_of_unknown_document_succeeds() {
    let app = setup_test_app().await;
    app.store.configure(|b| b.delete = DeleteBehavior::NotFound);

    let response = app.client().delete("/api/documents/ghost").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn remote_failure_keeps_local_row() {
    let app = setup_test_app().await;
    app.store.configure(|b| b.delete = DeleteBehavior::Fail);
    seed(&app, "doc-1", "a.txt", "text/plain").await;

    let response = app.client().delete("/api/documents/doc-1").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({
        "success": false,
        "message": "Failed to delete the file. Please try again."
    }));
    assert!(app.documents.get("doc-1").await.unwrap().is_some());
}

#[tokio::test]
async fn local_failure_is_reported_after_remote_removal() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "a.txt", "text/plain").await;
    app.documents.set_unavailable(true);

    let response = app.client().delete("/api/documents/doc-1").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "The document was removed from the search store but its metadata could not be deleted. Please try again."
    );
    assert_eq!(app.store.deletes().len(), 1);
}

#[tokio::test]
async fn blank_id_is_rejected() {
    let app = setup_test_app().await;

    let response = app.client().delete("/api/documents/%20").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "success": false,
        "message": "Invalid document ID provided"
    }));
    assert!(app.store.deletes().is_empty());
}

#[tokio::test]
async fn health_reflects_database_state() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "healthy");

    app.documents.set_unavailable(true);
    let response = app.client().get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn router_layers_echo_request_id_and_allow_cors() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health")
        .add_header("x-request-id", "req-42")
        .add_header("origin", "http://localhost:3000")
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), "req-42");
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/api/chat"].is_object());
}

/// Delegates to the in-memory store, but the first `list()` parks after taking
/// its snapshot until released.
struct StalledList {
    inner: InMemoryDocumentRepository,
    stall: AtomicBool,
    snapshot_taken: Notify,
    release: Notify,
}

impl StalledList {
    fn new(inner: InMemoryDocumentRepository) -> Self {
        Self {
            inner,
            stall: AtomicBool::new(true),
            snapshot_taken: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl DocumentRepository for StalledList {
    async fn insert(&self, document: NewDocument) -> Result<DocumentMetadata, DbError> {
        self.inner.insert(document).await
    }

    async fn get(&self, id: &str) -> Result<Option<DocumentMetadata>, DbError> {
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<DocumentMetadata>, DbError> {
        let rows = self.inner.list().await?;
        if self.stall.swap(false, Ordering::SeqCst) {
            self.snapshot_taken.notify_one();
            self.release.notified().await;
        }
        Ok(rows)
    }

    async fn update(
        &self,
        id: &str,
        changes: UpdateDocument,
    ) -> Result<DocumentMetadata, DbError> {
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: &str) -> Result<(), DbError> {
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn listing_overlapping_a_delete_does_not_outlive_it() {
    let app = setup_test_app().await;
    seed(&app, "doc-1", "notes.txt", "text/plain").await;

    let repo = Arc::new(StalledList::new(app.documents.clone()));
    let mut state = (*app.state).clone();
    state.documents = repo.clone() as Arc<dyn DocumentRepository>;
    let state = Arc::new(state);

    let reader = tokio::spawn({
        let state = state.clone();
        async move { listing::list_documents(&state).await }
    });

    repo.snapshot_taken.notified().await;
    deletion::delete_document(&state, "doc-1").await.unwrap();
    repo.release.notify_one();

    let in_flight = reader.await.unwrap();
    assert_eq!(in_flight.len(), 1);
    assert!(app.documents.is_empty().await);

    // The HTTP state shares the same cache.
    let response = app.client().get("/api/documents").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
    assert!(listing::list_documents(&state).await.is_empty());
}
