//! HTTP client for the ragdesk API, shared by the `ragdesk` binary.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ragdesk_core::constants::OCTET_STREAM;
use ragdesk_core::file_types::mime_from_extension;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Uploads wait for the search store to finish indexing.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(360);

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL from RAGDESK_API_URL, defaulting to a local server.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("RAGDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_documents(&self) -> Result<Vec<Value>> {
        let response = self.client.get(self.url("/api/documents")).send().await;
        parse(response).await
    }

    pub async fn get_document(&self, id: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(&format!("/api/documents/{}", id)))
            .send()
            .await;
        parse(response).await
    }

    /// Upload a local file; the MIME type is guessed from its extension.
    pub async fn upload(&self, path: &Path) -> Result<Value> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .context("Upload path has no file name")?;
        let contents = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mime = mime_from_extension(&file_name).unwrap_or(OCTET_STREAM);
        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(file_name)
            .mime_str(mime)
            .context("Invalid MIME type")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/embeddings/upload"))
            .multipart(form)
            .send()
            .await;
        parse(response).await
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<Value> {
        let response = self
            .client
            .patch(self.url(&format!("/api/documents/{}", id)))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await;
        parse(response).await
    }

    pub async fn delete(&self, id: &str) -> Result<Value> {
        let response = self
            .client
            .delete(self.url(&format!("/api/documents/{}", id)))
            .send()
            .await;
        parse(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Result<Response>) -> Result<T> {
    let response = response.context("Failed to send request")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(anyhow::anyhow!(
            "API request failed with status {}: {}",
            status,
            error_text
        ));
    }

    response
        .json()
        .await
        .context("Failed to parse response as JSON")
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
