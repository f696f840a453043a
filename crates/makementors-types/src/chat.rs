//! Chat session and message types for MakeMentors.
//!
//! Sessions tie one user to one mentor (template or custom); messages are
//! append-only and ordered by creation time within a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from the llm module (used in both chat and llm contexts).
pub use crate::llm::MessageRole;
pub use crate::mentor::MentorKind;

/// A persisted conversation thread between one user and one mentor.
///
/// `mentor_id` is interpreted against the catalog selected by `mentor_kind`:
/// a template string id or a custom mentor UUID. The pair is reconstructed
/// into a `MentorRef` at the storage boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: String,
    pub mentor_id: String,
    pub mentor_kind: MentorKind,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single message within a chat session. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_session_id: Uuid,
    /// The session owner; absent for messages persisted on behalf of
    /// anonymous callers in degraded flows.
    pub user_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// The `{id, role, content}` projection handed to conversation consumers.
///
/// Ordering follows the source messages (ascending creation time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
}

impl From<&ChatMessage> for TranscriptEntry {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            id: msg.id,
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_session_serialize() {
        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id: "user-1".to_string(),
            mentor_id: "crypto_day_trader_wyckoff_ta".to_string(),
            mentor_kind: MentorKind::Template,
            name: Some("Hello".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"mentor_kind\":\"template\""));
    }

    #[test]
    fn test_transcript_entry_from_message() {
        let msg = ChatMessage {
            id: Uuid::now_v7(),
            chat_session_id: Uuid::now_v7(),
            user_id: Some("user-1".to_string()),
            role: MessageRole::Assistant,
            content: "Welcome!".to_string(),
            created_at: Utc::now(),
        };
        let entry = TranscriptEntry::from(&msg);
        assert_eq!(entry.id, msg.id);
        assert_eq!(entry.role, MessageRole::Assistant);
        assert_eq!(entry.content, "Welcome!");
    }
}
