//! In-memory conversation state and session reconciliation.
//!
//! A [`Conversation`] holds the turns of one active conversation and keeps
//! exactly one persisted session per conversation lifecycle:
//!
//! - An existing session id is hydrated from the store exactly once.
//! - A welcome message with no session and no prior turns stays in memory;
//!   session creation is deferred until the first real user message.
//! - When the session is finally created, all in-memory turns are
//!   backfill-persisted in their original order before the new message.
//!
//! Each user send walks the [`SendPhase`] machine:
//! `Idle -> AwaitingSession -> Streaming -> Finalizing -> Idle`, with
//! `Cancelled` absorbing from `Streaming` and returning to `Idle` without
//! entering `Finalizing`.

use makementors_types::chat::{MessageRole, TranscriptEntry};
use makementors_types::error::RepositoryError;
use makementors_types::llm::Message;
use makementors_types::mentor::MentorRef;
use tracing::warn;
use uuid::Uuid;

use crate::chat::repository::ChatRepository;
use crate::chat::service::{session_name_from, ChatService};

/// Phase of a single user send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPhase {
    Idle,
    AwaitingSession,
    Streaming,
    Finalizing,
    Cancelled,
}

impl SendPhase {
    /// Whether `next` is a legal transition from this phase.
    pub fn can_transition(self, next: SendPhase) -> bool {
        use SendPhase::*;
        matches!(
            (self, next),
            (Idle, AwaitingSession)
                | (AwaitingSession, Streaming)
                | (Streaming, Finalizing)
                | (Streaming, Cancelled)
                | (Finalizing, Idle)
                | (Cancelled, Idle)
        )
    }
}

/// One in-memory turn, with its persistence status.
#[derive(Debug, Clone)]
pub struct Turn {
    pub id: Option<Uuid>,
    pub role: MessageRole,
    pub content: String,
}

/// In-memory conversation state for one user/mentor pair.
pub struct Conversation {
    mentor: MentorRef,
    user_id: Option<String>,
    session_id: Option<Uuid>,
    turns: Vec<Turn>,
    hydrated: bool,
    phase: SendPhase,
}

impl Conversation {
    pub fn new(mentor: MentorRef, user_id: Option<String>, session_id: Option<Uuid>) -> Self {
        Self {
            mentor,
            user_id,
            session_id,
            turns: Vec::new(),
            hydrated: false,
            phase: SendPhase::Idle,
        }
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    pub fn mentor(&self) -> &MentorRef {
        &self.mentor
    }

    /// The conversation turns in display order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The turns as LLM messages (prior history for the relay).
    pub fn history(&self) -> Vec<Message> {
        self.turns
            .iter()
            .map(|t| Message {
                role: t.role,
                content: t.content.clone(),
            })
            .collect()
    }

    /// Fetch messages from the store for an existing session, exactly once.
    ///
    /// No-op when there is no session id, when turns are already loaded, or
    /// when hydration already ran.
    pub async fn hydrate<C: ChatRepository>(
        &mut self,
        chat: &ChatService<C>,
    ) -> Result<(), RepositoryError> {
        if self.hydrated || !self.turns.is_empty() {
            return Ok(());
        }
        let Some(session_id) = self.session_id else {
            return Ok(());
        };

        let entries: Vec<TranscriptEntry> = chat.transcript(&session_id).await?;
        self.turns = entries
            .into_iter()
            .map(|e| Turn {
                id: Some(e.id),
                role: e.role,
                content: e.content,
            })
            .collect();
        self.hydrated = true;
        Ok(())
    }

    /// Add an assistant welcome message in memory only.
    ///
    /// Deliberately does not create a session: abandoned conversations that
    /// never get a real user message leave no rows behind.
    pub fn push_welcome(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            id: None,
            role: MessageRole::Assistant,
            content: content.into(),
        });
    }

    /// Begin a user send: ensure a session exists, backfill any turns that
    /// were only held in memory, then persist the new user message.
    ///
    /// Session creation is gated on `session_id.is_none()`, so it is
    /// attempted at most once per conversation lifecycle. Returns `true`
    /// when persistence is active for this conversation, `false` when it is
    /// running in degraded (memory-only) mode.
    pub async fn begin_send<C: ChatRepository>(
        &mut self,
        chat: &ChatService<C>,
        user_message: &str,
    ) -> bool {
        self.phase = SendPhase::AwaitingSession;

        let mut persisted = self.session_id.is_some();
        if self.session_id.is_none() {
            if let Some(user_id) = self.user_id.clone() {
                match chat
                    .create_session(
                        &user_id,
                        &self.mentor,
                        Some(session_name_from(user_message)),
                    )
                    .await
                {
                    Ok(session) => {
                        self.session_id = Some(session.id);
                        let pending = self.history();
                        chat.backfill_turns(session.id, Some(&user_id), &pending)
                            .await;
                        persisted = true;
                    }
                    Err(e) => {
                        warn!(error = %e, "session creation failed; continuing without persistence");
                        persisted = false;
                    }
                }
            }
        }

        self.turns.push(Turn {
            id: None,
            role: MessageRole::User,
            content: user_message.to_string(),
        });

        if persisted {
            if let Some(session_id) = self.session_id {
                if let Err(e) = chat
                    .save_user_message(
                        session_id,
                        self.user_id.as_deref(),
                        user_message.to_string(),
                    )
                    .await
                {
                    warn!(session_id = %session_id, error = %e, "failed to persist user message");
                }
            }
        }

        self.phase = SendPhase::Streaming;
        persisted
    }

    /// Adopt a session id resolved elsewhere (e.g. by the relay), once.
    pub fn adopt_session(&mut self, session_id: Uuid) {
        if self.session_id.is_none() {
            self.session_id = Some(session_id);
        }
    }

    /// Add a user turn in memory without persisting it (the relay persists
    /// it server-side).
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            id: None,
            role: MessageRole::User,
            content: content.into(),
        });
    }

    /// Record the latest cumulative assistant text while streaming.
    ///
    /// The final in-memory turn is replaced rather than appended, matching
    /// the render-replace streaming contract.
    pub fn on_chunk(&mut self, cumulative: &str) {
        if self.streaming_turn_active() {
            if let Some(turn) = self.turns.last_mut() {
                turn.content = cumulative.to_string();
            }
        } else {
            self.turns.push(Turn {
                id: None,
                role: MessageRole::Assistant,
                content: cumulative.to_string(),
            });
        }
    }

    /// Whether the final turn is the unpersisted assistant reply being built.
    fn streaming_turn_active(&self) -> bool {
        matches!(
            self.turns.last(),
            Some(turn) if turn.role == MessageRole::Assistant && turn.id.is_none()
        )
    }

    /// Complete a send: persist the final assistant text and return to idle.
    pub async fn finish<C: ChatRepository>(&mut self, chat: &ChatService<C>, full_text: &str) {
        self.phase = SendPhase::Finalizing;
        self.on_final_text(full_text);

        if !full_text.is_empty() {
            if let Some(session_id) = self.session_id {
                if let Err(e) = chat
                    .save_assistant_message(
                        session_id,
                        self.user_id.as_deref(),
                        full_text.to_string(),
                    )
                    .await
                {
                    warn!(session_id = %session_id, error = %e, "failed to persist assistant message");
                }
                let _ = chat.touch_session(&session_id).await;
            }
        }

        self.phase = SendPhase::Idle;
    }

    /// Cancel an in-flight send. Drops the partial assistant turn and skips
    /// finalization entirely.
    pub fn cancel(&mut self) {
        if self.phase == SendPhase::Streaming {
            self.phase = SendPhase::Cancelled;
            if self.streaming_turn_active() {
                self.turns.pop();
            }
        }
        self.phase = SendPhase::Idle;
    }

    fn on_final_text(&mut self, full_text: &str) {
        if self.streaming_turn_active() {
            if let Some(turn) = self.turns.last_mut() {
                turn.content = full_text.to_string();
            }
        } else if !full_text.is_empty() {
            self.turns.push(Turn {
                id: None,
                role: MessageRole::Assistant,
                content: full_text.to_string(),
            });
        }
    }
}
