//! Chat proxy
//!
//! Turns a UI message history into one grounded completion request and relays
//! the model's output as an AI SDK UI message stream.

use std::time::Duration;

use ragdesk_core::constants::{CITATION_INSTRUCTION, ORIGINAL_NAME_METADATA_KEY, SYSTEM_PROMPT};
use ragdesk_core::AppError;
use ragdesk_services::{ChatEvent, ChatRequest, ChatStream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::NO_MESSAGES_MESSAGE;
use crate::services::service_error;
use crate::state::AppState;

const TEXT_PART_ID: &str = "text-1";
const SOURCE_MEDIA_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub messages: Vec<UiMessage>,
    #[serde(default)]
    pub selected_data_sources: Option<Vec<SelectedDataSource>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UiMessage {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    #[serde(default)]
    pub parts: Vec<UiMessagePart>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UiMessagePart {
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A document the user restricted the search to.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SelectedDataSource {
    pub id: String,
    pub name: String,
}

/// Text of the latest message followed by the citation instruction.
pub fn build_prompt(message: &UiMessage) -> String {
    message
        .parts
        .iter()
        .map(|part| match part.part_type.as_str() {
            "text" => part.text.clone().unwrap_or_default(),
            _ => String::new(),
        })
        .chain(std::iter::once(CITATION_INSTRUCTION.to_string()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// OR of exact matches on each selected file's original name, in order.
pub fn build_metadata_filter(sources: &[SelectedDataSource]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }
    Some(
        sources
            .iter()
            .map(|source| {
                format!(
                    "{} = \"{}\"",
                    ORIGINAL_NAME_METADATA_KEY,
                    escape_filter_value(&source.name)
                )
            })
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

/// Validate the body and build the upstream request.
pub fn build_chat_request(
    body: &ChatRequestBody,
    store_name: String,
) -> Result<ChatRequest, AppError> {
    let last = body
        .messages
        .last()
        .ok_or_else(|| AppError::InvalidInput(NO_MESSAGES_MESSAGE.to_string()))?;

    let sources = body.selected_data_sources.as_deref().unwrap_or_default();

    Ok(ChatRequest {
        prompt: build_prompt(last),
        system_instruction: Some(SYSTEM_PROMPT.to_string()),
        store_name,
        metadata_filter: build_metadata_filter(sources),
    })
}

/// One chunk of the UI message stream protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiStreamPart {
    #[serde(rename_all = "camelCase")]
    Start { message_id: String },
    StartStep,
    TextStart { id: String },
    TextDelta { id: String, delta: String },
    #[serde(rename_all = "camelCase")]
    SourceDocument {
        source_id: String,
        media_type: String,
        title: String,
    },
    TextEnd { id: String },
    FinishStep,
    Finish,
    #[serde(rename_all = "camelCase")]
    Error { error_text: String },
}

/// What the SSE body carries: protocol parts, then the terminal marker.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Part(UiStreamPart),
    Done,
}

/// Open the upstream completion for `body`.
pub async fn start_chat(state: &AppState, body: &ChatRequestBody) -> Result<ChatStream, AppError> {
    let request = build_chat_request(body, state.store_name()?)?;

    tracing::info!(
        messages = body.messages.len(),
        filtered = request.metadata_filter.is_some(),
        "Starting chat completion"
    );

    state
        .ai
        .chat
        .stream_chat(request)
        .await
        .map_err(|e| {
            service_error(e, |source| AppError::InternalWithSource {
                message: "Chat completion request failed".to_string(),
                source,
            })
        })
}

/// Relay upstream events as protocol frames until the answer ends, fails or
/// runs past `max_duration`. Stops early when the receiver goes away.
pub async fn relay_chat(
    mut upstream: ChatStream,
    frames: mpsc::Sender<StreamFrame>,
    max_duration: Duration,
) {
    let text_id = TEXT_PART_ID.to_string();
    let opening = [
        UiStreamPart::Start {
            message_id: format!("msg-{}", Uuid::new_v4().simple()),
        },
        UiStreamPart::StartStep,
        UiStreamPart::TextStart {
            id: text_id.clone(),
        },
    ];
    for part in opening {
        if frames.send(StreamFrame::Part(part)).await.is_err() {
            return;
        }
    }

    let deadline = tokio::time::sleep(max_duration);
    tokio::pin!(deadline);

    let mut failure: Option<String> = None;
    loop {
        let part = tokio::select! {
            _ = &mut deadline => {
                tracing::warn!(?max_duration, "Chat stream exceeded its maximum duration");
                failure = Some("The response took too long and was stopped.".to_string());
                break;
            }
            event = upstream.recv() => match event {
                Some(Ok(ChatEvent::TextDelta(delta))) => UiStreamPart::TextDelta {
                    id: text_id.clone(),
                    delta,
                },
                Some(Ok(ChatEvent::Source { title, uri })) => UiStreamPart::SourceDocument {
                    source_id: uri.unwrap_or_else(|| title.clone()),
                    media_type: SOURCE_MEDIA_TYPE.to_string(),
                    title,
                },
                Some(Ok(ChatEvent::Finished { reason })) => {
                    tracing::debug!(%reason, "Chat completion finished");
                    continue;
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Chat stream failed upstream");
                    failure = Some("An error occurred while generating the response.".to_string());
                    break;
                }
                None => break,
            }
        };

        if frames.send(StreamFrame::Part(part)).await.is_err() {
            tracing::debug!("Chat client disconnected");
            return;
        }
    }

    let closing = match failure {
        Some(error_text) => vec![UiStreamPart::Error { error_text }],
        None => vec![
            UiStreamPart::TextEnd { id: text_id },
            UiStreamPart::FinishStep,
            UiStreamPart::Finish,
        ],
    };
    for part in closing {
        if frames.send(StreamFrame::Part(part)).await.is_err() {
            return;
        }
    }
    let _ = frames.send(StreamFrame::Done).await;
}
