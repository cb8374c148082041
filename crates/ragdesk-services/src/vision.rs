//! Image to Markdown summarization
//!
//! The search store only indexes text, so images are described by a
//! multimodal model and the resulting Markdown is ingested instead.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};
use crate::gemini::{Content, GeminiClient, GenerateContentResponse, Part};

const VISION_TEMPERATURE: f32 = 0.2;

const VISION_PROMPT: &str = "You are preparing an uploaded image for a knowledge base that only accepts text documents.
Analyze the image and produce Markdown with the following sections:
## High-level Summary (2-4 bullet points)
## Key Details (facts, entities, objects, context)
## Detected Text (transcribe any visible text verbatim, keep Markdown code fences for structured data)
## Suggested Tags (comma separated list of themes)
Preserve factual details. If something is uncertain, note it as such. Keep the response concise but information-dense.";

#[async_trait]
pub trait VisionSummarizer: Send + Sync {
    /// Describe an image as Markdown with the fixed section layout.
    async fn summarize_image(&self, image: &[u8], mime_type: &str) -> ServiceResult<String>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// [`VisionSummarizer`] backed by `models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiVisionSummarizer {
    client: GeminiClient,
    model: String,
}

impl GeminiVisionSummarizer {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl VisionSummarizer for GeminiVisionSummarizer {
    #[tracing::instrument(skip(self, image), fields(model = %self.model, bytes = image.len()))]
    async fn summarize_image(&self, image: &[u8], mime_type: &str) -> ServiceResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::text(VISION_PROMPT),
                    Part::inline(mime_type, general_purpose::STANDARD.encode(image)),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: VISION_TEMPERATURE,
            },
        };

        let url = self
            .client
            .api_url(&format!("models/{}:generateContent", self.model));
        let response = self
            .client
            .authorize(self.client.http().post(&url))?
            .json(&request)
            .send()
            .await?;
        let response = GeminiClient::check_status(response, &self.model).await?;

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            ServiceError::InvalidResponse(format!("failed to parse vision response: {}", e))
        })?;

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(ServiceError::InvalidResponse(
                "vision model returned no text".to_string(),
            ));
        }

        Ok(text.trim().to_string())
    }
}

/// Wrap a model summary into the document that gets ingested.
pub fn build_summary_document(
    original_name: &str,
    original_mime: &str,
    summary: &str,
    processed_at: DateTime<Utc>,
) -> String {
    format!(
        "# Image Document: {name}\n\n{summary}\n\n---\n### Ingestion Metadata\n- Original filename: {name}\n- Original MIME type: {mime}\n- Processed at: {at}\n",
        name = original_name,
        summary = summary.trim(),
        mime = original_mime,
        at = processed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}
