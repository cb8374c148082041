//! File Search store client
//!
//! Documents are ingested with the resumable media upload protocol
//! (`uploadToFileSearchStore`), which answers with a long-running operation.
//! The caller polls [`FileSearchStore::get_operation`] until `done`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::gemini::GeminiClient;

/// Key/value pair attached to an ingested document; usable in metadata filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetadata {
    pub key: String,
    pub string_value: String,
}

impl CustomMetadata {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            string_value: value.into(),
        }
    }
}

/// A staged file to ingest into a store.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Store resource name, e.g. `fileSearchStores/my-store-123`.
    pub store_name: String,
    pub path: PathBuf,
    pub display_name: String,
    pub mime_type: String,
    pub custom_metadata: Vec<CustomMetadata>,
}

/// Long-running operation handle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub error: Option<OperationError>,
    pub response: Option<OperationResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    pub code: Option<i32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// `fileSearchStores/{store}/documents/{document}`
    pub document_name: Option<String>,
}

impl Operation {
    /// Document id: the path segment after `/documents/` in the response's
    /// document resource name.
    pub fn document_id(&self) -> Option<&str> {
        let document_name = self.response.as_ref()?.document_name.as_deref()?;
        let (_, id) = document_name.split_once("/documents/")?;
        let id = id.trim_matches('/');
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }
}

/// The hosted document store.
#[async_trait]
pub trait FileSearchStore: Send + Sync {
    /// Start ingesting a file; returns the operation to poll.
    async fn upload_to_store(&self, request: UploadRequest) -> ServiceResult<Operation>;

    /// Fetch the current state of an operation by resource name.
    async fn get_operation(&self, operation_name: &str) -> ServiceResult<Operation>;

    /// Force-delete a document (and its chunks). `ServiceError::NotFound` when
    /// the store has no such document.
    async fn delete_document(&self, store_name: &str, document_id: &str) -> ServiceResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartUploadBody<'a> {
    display_name: &'a str,
    mime_type: &'a str,
    #[serde(skip_serializing_if = "no_metadata")]
    custom_metadata: &'a [CustomMetadata],
}

fn no_metadata(metadata: &&[CustomMetadata]) -> bool {
    metadata.is_empty()
}

/// [`FileSearchStore`] over the Generative Language REST API.
#[derive(Debug, Clone)]
pub struct GeminiFileSearchStore {
    client: GeminiClient,
}

impl GeminiFileSearchStore {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FileSearchStore for GeminiFileSearchStore {
    #[tracing::instrument(skip(self, request), fields(store = %request.store_name, display_name = %request.display_name))]
    async fn upload_to_store(&self, request: UploadRequest) -> ServiceResult<Operation> {
        let data = tokio::fs::read(&request.path).await?;

        let start_url = self
            .client
            .upload_url(&format!("{}:uploadToFileSearchStore", request.store_name));
        let body = StartUploadBody {
            display_name: &request.display_name,
            mime_type: &request.mime_type,
            custom_metadata: &request.custom_metadata,
        };

        let start = self
            .client
            .authorize(self.client.http().post(&start_url))?
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", &request.mime_type)
            .json(&body)
            .send()
            .await?;
        let start = GeminiClient::check_status(start, &request.store_name).await?;

        let session_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::InvalidResponse("upload session URL missing from response".to_string())
            })?;

        tracing::debug!(bytes = data.len(), "Upload session started, sending file");

        let finalize = self
            .client
            .authorize(self.client.http().post(&session_url))?
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await?;
        let finalize = GeminiClient::check_status(finalize, &request.store_name).await?;

        let operation: Operation = finalize.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("failed to parse upload operation: {}", e))
        })?;

        tracing::info!(operation = %operation.name, done = operation.done, "Upload operation started");
        Ok(operation)
    }

    #[tracing::instrument(skip(self))]
    async fn get_operation(&self, operation_name: &str) -> ServiceResult<Operation> {
        let url = self.client.api_url(operation_name);
        let response = self
            .client
            .authorize(self.client.http().get(&url))?
            .send()
            .await?;
        let response = GeminiClient::check_status(response, operation_name).await?;

        response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("failed to parse operation status: {}", e))
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_document(&self, store_name: &str, document_id: &str) -> ServiceResult<()> {
        let document_name = format!("{}/documents/{}", store_name, document_id);
        let url = self.client.api_url(&document_name);
        let response = self
            .client
            .authorize(self.client.http().delete(&url))?
            .query(&[("force", "true")])
            .send()
            .await?;
        GeminiClient::check_status(response, &document_name).await?;
        Ok(())
    }
}
