use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::stream;
use tokio::sync::mpsc;

use crate::constants::{STREAM_DONE_MARKER, UI_MESSAGE_STREAM_HEADER, UI_MESSAGE_STREAM_VERSION};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::chat_proxy::{self, ChatRequestBody, StreamFrame};
use crate::state::AppState;

fn frame_event(frame: StreamFrame) -> Event {
    match frame {
        StreamFrame::Part(part) => match Event::default().json_data(&part) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode chat stream part");
                Event::default().comment("dropped part")
            }
        },
        StreamFrame::Done => Event::default().data(STREAM_DONE_MARKER),
    }
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequestBody,
    responses(
        (status = 200, description = "AI SDK UI message stream", content_type = "text/event-stream", body = String),
        (status = 400, description = "No messages provided", body = ErrorResponse),
        (status = 500, description = "Chat could not be started", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<ChatRequestBody>,
) -> Result<Response, HttpAppError> {
    let upstream = chat_proxy::start_chat(&state, &body).await?;

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(chat_proxy::relay_chat(
        upstream,
        tx,
        state.config.chat_max_duration(),
    ));

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|frame| (Ok::<_, Infallible>(frame_event(frame)), rx))
    });

    Ok((
        [(
            HeaderName::from_static(UI_MESSAGE_STREAM_HEADER),
            HeaderValue::from_static(UI_MESSAGE_STREAM_VERSION),
        )],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response())
}
