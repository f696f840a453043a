//! The streamed chat relay endpoint.
//!
//! POST /api/v1/chat
//!
//! With `stream: true` (the default) the response is a Server-Sent-Event
//! stream: each event is `data: {"response": "<cumulative text>"}` (plus
//! `data: {"warning": ...}` events), terminated by `data: [DONE]`. The
//! resolved session id is carried in the `X-Chat-Session-Id` response
//! header for session-less requests. With `stream: false` the response is
//! a single JSON object `{response, sessionId}`.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use makementors_core::relay::{RelayEvent, RelayRequest};
use makementors_observe::genai_attrs;
use makementors_types::llm::{Message, MessageRole};
use makementors_types::mentor::{MentorRef, UserProfile};

use crate::http::error::AppError;
use crate::state::AppState;

/// Response header carrying the resolved session id.
pub const SESSION_ID_HEADER: &str = "x-chat-session-id";

/// One `{role, content}` turn on the wire.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Request body for the relay endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRelayBody {
    /// Full conversation so far; the last entry is the new user message.
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub user_preferences: Option<UserProfile>,
    pub mentor_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub chat_session_id: Option<Uuid>,
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

/// Split the wire messages into prior history and the new user message.
fn split_messages(messages: Vec<WireMessage>) -> Result<(Vec<Message>, String), AppError> {
    let mut turns: Vec<Message> = messages
        .into_iter()
        .map(|m| Message {
            role: m.role,
            content: m.content,
        })
        .collect();

    match turns.pop() {
        Some(last) if last.role == MessageRole::User => Ok((turns, last.content)),
        Some(_) => Err(AppError::Validation(
            "The last message must be from the user".to_string(),
        )),
        None => Err(AppError::Validation(
            "At least one message is required".to_string(),
        )),
    }
}

/// POST /api/v1/chat - Relay one user send to the LLM provider.
pub async fn relay_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRelayBody>,
) -> Result<Response, AppError> {
    let (history, user_message) = split_messages(body.messages)?;

    // The mentor id is classified exactly once at this boundary.
    let mentor = MentorRef::classify(&body.mentor_id);

    tracing::info!(
        { genai_attrs::GEN_AI_OPERATION_NAME } = genai_attrs::OP_CHAT,
        { genai_attrs::GEN_AI_PROVIDER_NAME } = "openai",
        { genai_attrs::GEN_AI_REQUEST_MODEL } = %state.config.llm.model,
        { genai_attrs::GEN_AI_AGENT_ID } = %mentor.id_str(),
        "relaying chat completion"
    );

    let request = RelayRequest {
        mentor,
        history,
        user_message,
        profile: body.user_preferences,
        user_id: body.user_id,
        session_id: body.chat_session_id,
    };

    if !body.stream {
        let result = state.relay.complete(request).await;
        let mut payload = json!({
            "response": result.response,
            "sessionId": result.session_id,
        });
        if let Some(warning) = result.warning {
            payload["warning"] = json!(warning);
        }
        return Ok(Json(payload).into_response());
    }

    // A new send for a session supersedes its in-flight stream. Entries are
    // replaced on the next send; completed tokens linger until then.
    let cancel = CancellationToken::new();
    if let Some(sid) = body.chat_session_id {
        if let Some(previous) = state.streams.insert(sid, cancel.clone()) {
            previous.cancel();
        }
    }

    let mut relay_stream = state.relay.clone().send(request, cancel.clone());

    // The first relay event is always Session: surface it as a header so
    // session-less callers learn their new id before the first chunk.
    let mut headers = HeaderMap::new();
    if let Some(RelayEvent::Session {
        session_id: Some(sid),
        ..
    }) = relay_stream.next().await
    {
        if let Ok(value) = HeaderValue::from_str(&sid.to_string()) {
            headers.insert(HeaderName::from_static(SESSION_ID_HEADER), value);
        }
        state.streams.insert(sid, cancel.clone());
    }

    let sse_stream = async_stream::stream! {
        while let Some(event) = relay_stream.next().await {
            match event {
                RelayEvent::Chunk { text } => {
                    let data = json!({ "response": text });
                    yield Ok::<_, Infallible>(Event::default().data(data.to_string()));
                }
                RelayEvent::Warning { message } => {
                    let data = json!({ "warning": message });
                    yield Ok(Event::default().data(data.to_string()));
                }
                RelayEvent::Done => {
                    yield Ok(Event::default().data("[DONE]"));
                }
                RelayEvent::Session { .. } => {}
            }
        }
    };

    let sse = Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)));
    Ok((headers, sse).into_response())
}
