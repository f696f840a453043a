//! Chat service orchestrating session lifecycle and message persistence.
//!
//! ChatService wraps a ChatRepository with the domain-level operations the
//! relay and the conversation manager need: lazy session creation, ordered
//! message persistence, and transcript projection.

use chrono::Utc;
use makementors_types::chat::{ChatMessage, ChatSession, MessageRole, TranscriptEntry};
use makementors_types::error::RepositoryError;
use makementors_types::llm::Message;
use makementors_types::mentor::MentorRef;
use tracing::warn;
use uuid::Uuid;

use crate::chat::repository::ChatRepository;

/// Longest session name derived from the opening user message.
const SESSION_NAME_MAX: usize = 60;

/// Derive a session name from the first user message.
pub fn session_name_from(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.chars().count() <= SESSION_NAME_MAX {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(SESSION_NAME_MAX).collect();
    format!("{}…", cut.trim_end())
}

/// Orchestrates chat session lifecycle and message persistence.
///
/// Generic over `ChatRepository` to maintain clean architecture
/// (makementors-core never depends on makementors-infra).
pub struct ChatService<C: ChatRepository> {
    chat_repo: C,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(chat_repo: C) -> Self {
        Self { chat_repo }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    // --- Session lifecycle ---

    /// Create a new chat session for a user and mentor.
    pub async fn create_session(
        &self,
        user_id: &str,
        mentor: &MentorRef,
        name: Option<String>,
    ) -> Result<ChatSession, RepositoryError> {
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            mentor_id: mentor.id_str(),
            mentor_kind: mentor.kind(),
            name,
            created_at: now,
            updated_at: now,
        };

        self.chat_repo.create_session(&session).await
    }

    /// Get a session by ID.
    pub async fn get_session(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        self.chat_repo.get_session(session_id).await
    }

    /// List sessions for a user, most recently updated first.
    pub async fn list_sessions(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        self.chat_repo
            .list_sessions_for_user(user_id, limit, offset)
            .await
    }

    /// Delete a session and its messages.
    pub async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        self.chat_repo.delete_session(session_id).await
    }

    /// Bump the session's `updated_at`.
    pub async fn touch_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        self.chat_repo.touch_session(session_id).await
    }

    // --- Message persistence ---

    /// Save a user message to a session.
    pub async fn save_user_message(
        &self,
        session_id: Uuid,
        user_id: Option<&str>,
        content: String,
    ) -> Result<ChatMessage, RepositoryError> {
        self.save_turn(session_id, user_id, MessageRole::User, content)
            .await
    }

    /// Save an assistant message to a session.
    pub async fn save_assistant_message(
        &self,
        session_id: Uuid,
        user_id: Option<&str>,
        content: String,
    ) -> Result<ChatMessage, RepositoryError> {
        self.save_turn(session_id, user_id, MessageRole::Assistant, content)
            .await
    }

    async fn save_turn(
        &self,
        session_id: Uuid,
        user_id: Option<&str>,
        role: MessageRole,
        content: String,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            chat_session_id: session_id,
            user_id: user_id.map(|u| u.to_string()),
            role,
            content,
            created_at: Utc::now(),
        };

        self.chat_repo.save_message(&message).await?;
        Ok(message)
    }

    /// Persist in-memory turns against a freshly created session, in their
    /// original order. A failed turn is logged and skipped so one bad row
    /// does not lose the rest of the backfill.
    pub async fn backfill_turns(
        &self,
        session_id: Uuid,
        user_id: Option<&str>,
        turns: &[Message],
    ) -> usize {
        let mut saved = 0;
        for turn in turns {
            match self
                .save_turn(session_id, user_id, turn.role, turn.content.clone())
                .await
            {
                Ok(_) => saved += 1,
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "failed to backfill message");
                }
            }
        }
        saved
    }

    /// Get messages for a session, ordered by creation time.
    pub async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.chat_repo.get_messages(session_id, limit, offset).await
    }

    /// Load a session's messages as `{id, role, content}` entries,
    /// preserving ascending creation order.
    pub async fn transcript(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<TranscriptEntry>, RepositoryError> {
        let messages = self.chat_repo.get_messages(session_id, None, None).await?;
        Ok(messages.iter().map(TranscriptEntry::from).collect())
    }
}
