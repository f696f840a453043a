//! The streamed chat relay engine.
//!
//! One engine instance serves all conversations. Per send it resolves the
//! session (creating it lazily and backfilling in-memory history), resolves
//! the mentor persona, opens a provider token stream, forwards the
//! **cumulative** text per delta, and persists exactly one assistant message
//! once the stream completes. Provider failures surface as a fixed apology
//! through the same streaming interface; they never hard-fail the caller.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use makementors_types::llm::{CompletionRequest, Message, StreamEvent};
use makementors_types::mentor::{MentorRef, UserProfile};

use crate::chat::repository::ChatRepository;
use crate::chat::service::{session_name_from, ChatService};
use crate::llm::provider::LlmProvider;
use crate::mentor::repository::{MentorRepository, TemplateCatalog};
use crate::mentor::resolver::PersonaResolver;
use crate::relay::prompt::apply_profile;

/// Fixed assistant reply substituted when the upstream provider fails.
pub const FALLBACK_RESPONSE: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again later.";

/// Model parameters applied to every relayed completion.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// One user send, as received at the relay boundary.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub mentor: MentorRef,
    /// Prior turns in display order (may include an unpersisted welcome).
    pub history: Vec<Message>,
    pub user_message: String,
    pub profile: Option<UserProfile>,
    pub user_id: Option<String>,
    pub session_id: Option<Uuid>,
}

/// Events emitted to the caller while relaying one send.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Always first: the resolved session (if any) and whether persistence
    /// is degraded for this send.
    Session {
        session_id: Option<Uuid>,
        degraded: bool,
    },
    /// Cumulative assistant text so far. Callers render-replace.
    Chunk { text: String },
    /// Non-fatal problem the caller should surface softly.
    Warning { message: String },
    /// Terminal sentinel for a completed (non-cancelled) send.
    Done,
}

/// Result of the non-streaming relay path.
#[derive(Debug, Clone)]
pub struct RelayCompletion {
    pub response: String,
    pub session_id: Option<Uuid>,
    pub degraded: bool,
    pub warning: Option<String>,
}

/// Orchestrates streamed chat completions against the persistence layer.
pub struct RelayEngine<C, T, M, P>
where
    C: ChatRepository,
    T: TemplateCatalog,
    M: MentorRepository,
    P: LlmProvider,
{
    chat: ChatService<C>,
    resolver: PersonaResolver<T, M>,
    llm: P,
    options: RelayOptions,
}

impl<C, T, M, P> RelayEngine<C, T, M, P>
where
    C: ChatRepository + 'static,
    T: TemplateCatalog + 'static,
    M: MentorRepository + 'static,
    P: LlmProvider + 'static,
{
    pub fn new(
        chat: ChatService<C>,
        resolver: PersonaResolver<T, M>,
        llm: P,
        options: RelayOptions,
    ) -> Self {
        Self {
            chat,
            resolver,
            llm,
            options,
        }
    }

    pub fn chat(&self) -> &ChatService<C> {
        &self.chat
    }

    /// Resolve (or lazily create) the session for a send.
    ///
    /// Returns the session id (if any) and whether persistence is degraded.
    /// On creation, the request's in-memory history is backfilled in order
    /// before the caller persists the new user message.
    async fn resolve_session(&self, request: &RelayRequest) -> (Option<Uuid>, bool) {
        if let Some(session_id) = request.session_id {
            return (Some(session_id), false);
        }
        let Some(user_id) = request.user_id.as_deref() else {
            // Anonymous sends stay in memory only; not degraded, just unsaved.
            return (None, false);
        };

        match self
            .chat
            .create_session(
                user_id,
                &request.mentor,
                Some(session_name_from(&request.user_message)),
            )
            .await
        {
            Ok(session) => {
                self.chat
                    .backfill_turns(session.id, Some(user_id), &request.history)
                    .await;
                (Some(session.id), false)
            }
            Err(e) => {
                warn!(error = %e, "session creation failed; continuing without persistence");
                (None, true)
            }
        }
    }

    fn build_completion(&self, request: &RelayRequest, system: String, stream: bool) -> CompletionRequest {
        let mut messages = request.history.clone();
        messages.push(Message::user(request.user_message.clone()));
        CompletionRequest {
            model: self.options.model.clone(),
            messages,
            system: Some(system),
            max_tokens: self.options.max_tokens,
            temperature: Some(self.options.temperature),
            stream,
        }
    }

    /// Relay one send as a stream of [`RelayEvent`]s.
    ///
    /// The first event is always `Session`. Cancelling the token stops
    /// forwarding immediately and suppresses persistence; a cancelled stream
    /// ends without a `Done` sentinel. The assistant message is persisted
    /// after `Done` has been emitted, so the visible stream is never blocked
    /// on the database write.
    pub fn send(
        self: Arc<Self>,
        request: RelayRequest,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Stream<Item = RelayEvent> + Send + 'static>> {
        let engine = self;
        Box::pin(async_stream::stream! {
            let (session_id, degraded) = engine.resolve_session(&request).await;
            yield RelayEvent::Session { session_id, degraded };
            if degraded {
                yield RelayEvent::Warning {
                    message: "This conversation may not be saved.".to_string(),
                };
            }

            if let Some(sid) = session_id {
                if let Err(e) = engine
                    .chat
                    .save_user_message(sid, request.user_id.as_deref(), request.user_message.clone())
                    .await
                {
                    warn!(session_id = %sid, error = %e, "failed to persist user message");
                    yield RelayEvent::Warning {
                        message: "Your message may not be saved.".to_string(),
                    };
                }
            }

            let persona = engine.resolver.resolve(&request.mentor).await;
            let system = apply_profile(&persona.system_prompt, request.profile.as_ref());
            let completion = engine.build_completion(&request, system, true);

            let mut upstream = engine.llm.stream(completion);
            let mut accumulated = String::new();
            let mut upstream_failed = false;
            let mut cancelled = false;

            loop {
                // Yields live outside the select arms: the generator resumes
                // here, not inside the macro expansion.
                let event = tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(session_id = ?session_id, "stream cancelled by caller");
                        cancelled = true;
                        break;
                    }
                    event = upstream.next() => event,
                };

                match event {
                    None => break,
                    Some(Ok(StreamEvent::TextDelta { text })) => {
                        accumulated.push_str(&text);
                        yield RelayEvent::Chunk { text: accumulated.clone() };
                    }
                    Some(Ok(StreamEvent::Done)) => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "upstream provider error; substituting fallback response");
                        upstream_failed = true;
                        break;
                    }
                }
            }

            if cancelled {
                // Terminal without Done: nothing is persisted for this send.
            } else if upstream_failed {
                // The apology flows through the same streaming interface and
                // is never persisted.
                yield RelayEvent::Chunk { text: FALLBACK_RESPONSE.to_string() };
                yield RelayEvent::Done;
            } else if accumulated.is_empty() {
                yield RelayEvent::Warning {
                    message: "The mentor returned an empty reply; nothing was saved.".to_string(),
                };
                yield RelayEvent::Done;
            } else {
                yield RelayEvent::Done;

                // Finalize after the sentinel: the caller has the full text,
                // so the response is not blocked on this write.
                if let Some(sid) = session_id {
                    if let Err(e) = engine
                        .chat
                        .save_assistant_message(sid, request.user_id.as_deref(), accumulated)
                        .await
                    {
                        warn!(session_id = %sid, error = %e, "failed to persist assistant message");
                    } else if let Err(e) = engine.chat.touch_session(&sid).await {
                        warn!(session_id = %sid, error = %e, "failed to touch session");
                    }
                }
            }
        })
    }

    /// Relay one send without streaming.
    ///
    /// Same session/persona/persistence contract as [`Self::send`], but the
    /// reply is returned whole.
    pub async fn complete(&self, request: RelayRequest) -> RelayCompletion {
        let (session_id, degraded) = self.resolve_session(&request).await;
        let mut warning = degraded.then(|| "This conversation may not be saved.".to_string());

        if let Some(sid) = session_id {
            if let Err(e) = self
                .chat
                .save_user_message(sid, request.user_id.as_deref(), request.user_message.clone())
                .await
            {
                warn!(session_id = %sid, error = %e, "failed to persist user message");
            }
        }

        let persona = self.resolver.resolve(&request.mentor).await;
        let system = apply_profile(&persona.system_prompt, request.profile.as_ref());
        let completion = self.build_completion(&request, system, false);

        let response = match self.llm.complete(&completion).await {
            Ok(resp) => resp.content,
            Err(e) => {
                warn!(error = %e, "upstream provider error; substituting fallback response");
                return RelayCompletion {
                    response: FALLBACK_RESPONSE.to_string(),
                    session_id,
                    degraded,
                    warning,
                };
            }
        };

        if response.is_empty() {
            warning = Some("The mentor returned an empty reply; nothing was saved.".to_string());
        } else if let Some(sid) = session_id {
            if let Err(e) = self
                .chat
                .save_assistant_message(sid, request.user_id.as_deref(), response.clone())
                .await
            {
                warn!(session_id = %sid, error = %e, "failed to persist assistant message");
            } else {
                let _ = self.chat.touch_session(&sid).await;
            }
        }

        RelayCompletion {
            response,
            session_id,
            degraded,
            warning,
        }
    }
}
