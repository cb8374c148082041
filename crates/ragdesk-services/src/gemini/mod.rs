//! Shared plumbing for the Generative Language REST API.

mod types;

pub use types::*;

use std::fmt::{Debug, Formatter, Result as FmtResult};

use anyhow::Context;
use ragdesk_core::GoogleAiConfig;
use reqwest::{RequestBuilder, Response, StatusCode};

use crate::error::{ServiceError, ServiceResult};

const API_VERSION: &str = "v1beta";

/// HTTP client bound to one API key and base URL.
///
/// The key is optional at construction time; calls fail with
/// [`ServiceError::MissingApiKey`] until one is configured.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl Debug for GeminiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key_configured", &self.api_key.is_some())
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &GoogleAiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client for Google AI API")?;

        Ok(Self::with_http_client(http, config))
    }

    fn with_http_client(http: reqwest::Client, config: &GoogleAiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn api_key(&self) -> ServiceResult<&str> {
        self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)
    }

    /// `{base}/v1beta/{path}`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_VERSION, path.trim_start_matches('/'))
    }

    /// `{base}/upload/v1beta/{path}`
    pub fn upload_url(&self, path: &str) -> String {
        format!(
            "{}/upload/{}/{}",
            self.base_url,
            API_VERSION,
            path.trim_start_matches('/')
        )
    }

    /// Attach the API key header.
    pub fn authorize(&self, request: RequestBuilder) -> ServiceResult<RequestBuilder> {
        Ok(request.header("x-goog-api-key", self.api_key()?))
    }

    /// Map non-success statuses to [`ServiceError`].
    pub async fn check_status(response: Response, resource: &str) -> ServiceResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(resource.to_string()));
        }

        Err(ServiceError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        })
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error.message)
        .unwrap_or_else(|| body.to_string())
}
