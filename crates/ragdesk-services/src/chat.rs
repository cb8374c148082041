//! Streaming chat with the File Search tool bound to a store.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{ServiceError, ServiceResult};
use crate::gemini::{Content, GeminiClient, GenerateContentResponse, Part};

/// Incremental output of a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    TextDelta(String),
    /// A document the answer was grounded on.
    Source { title: String, uri: Option<String> },
    Finished { reason: String },
}

pub type ChatStream = mpsc::Receiver<ServiceResult<ChatEvent>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub store_name: String,
    /// Metadata filter expression restricting the searched documents.
    pub metadata_filter: Option<String>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Start a streamed completion. Events arrive on the returned channel as
    /// the upstream produces them; the channel closes when the answer ends.
    async fn stream_chat(&self, request: ChatRequest) -> ServiceResult<ChatStream>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    file_search: FileSearchTool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileSearchTool {
    file_search_store_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata_filter: Option<String>,
}

fn request_body(request: &ChatRequest) -> StreamRequestBody {
    StreamRequestBody {
        system_instruction: request.system_instruction.as_ref().map(|text| Content {
            role: None,
            parts: vec![Part::text(text.clone())],
        }),
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(request.prompt.clone())],
        }],
        tools: vec![Tool {
            file_search: FileSearchTool {
                file_search_store_names: vec![request.store_name.clone()],
                metadata_filter: request.metadata_filter.clone(),
            },
        }],
    }
}

/// Splits a byte stream into lines, carrying partial lines across chunks.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            lines.push(line.trim_end_matches(['\r', '\n']).to_string());
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        Some(rest)
    }
}

/// Translate one streamed `GenerateContentResponse` into events.
fn chunk_events(chunk: &GenerateContentResponse) -> Vec<ChatEvent> {
    let mut events = Vec::new();
    let Some(candidate) = chunk.candidates.first() else {
        return events;
    };

    let text = chunk.text();
    if !text.is_empty() {
        events.push(ChatEvent::TextDelta(text));
    }

    if let Some(grounding) = &candidate.grounding_metadata {
        for context in grounding
            .grounding_chunks
            .iter()
            .filter_map(|c| c.retrieved_context.as_ref())
        {
            if let Some(title) = &context.title {
                events.push(ChatEvent::Source {
                    title: title.clone(),
                    uri: context.uri.clone(),
                });
            }
        }
    }

    if let Some(reason) = &candidate.finish_reason {
        events.push(ChatEvent::Finished {
            reason: reason.clone(),
        });
    }

    events
}

fn parse_data_line(line: &str) -> Option<ServiceResult<GenerateContentResponse>> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(serde_json::from_str(data).map_err(|e| {
        ServiceError::InvalidResponse(format!("failed to parse stream chunk: {}", e))
    }))
}

/// [`ChatModel`] backed by `models/{model}:streamGenerateContent?alt=sse`.
#[derive(Debug, Clone)]
pub struct GeminiChatModel {
    client: GeminiClient,
    model: String,
}

impl GeminiChatModel {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    #[tracing::instrument(skip(self, request), fields(model = %self.model, filtered = request.metadata_filter.is_some()))]
    async fn stream_chat(&self, request: ChatRequest) -> ServiceResult<ChatStream> {
        let url = self
            .client
            .api_url(&format!("models/{}:streamGenerateContent", self.model));
        let response = self
            .client
            .authorize(self.client.http().post(&url))?
            .query(&[("alt", "sse")])
            .json(&request_body(&request))
            .send()
            .await?;
        let response = GeminiClient::check_status(response, &self.model).await?;

        let (tx, rx) = mpsc::channel(32);
        let mut stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut lines = LineBuffer::default();
            let mut seen_sources: Vec<String> = Vec::new();

            loop {
                let batch = match stream.next().await {
                    Some(Ok(bytes)) => lines.push(&bytes),
                    Some(Err(e)) => {
                        let _ = tx.send(Err(ServiceError::Transport(e))).await;
                        return;
                    }
                    None => match lines.finish() {
                        Some(rest) => vec![rest],
                        None => break,
                    },
                };

                for line in batch {
                    let Some(parsed) = parse_data_line(&line) else {
                        continue;
                    };
                    let events = match parsed {
                        Ok(chunk) => chunk_events(&chunk),
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    };
                    for event in events {
                        if let ChatEvent::Source { title, .. } = &event {
                            if seen_sources.contains(title) {
                                continue;
                            }
                            seen_sources.push(title.clone());
                        }
                        if tx.send(Ok(event)).await.is_err() {
                            tracing::debug!("Chat consumer went away, stopping upstream read");
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}
