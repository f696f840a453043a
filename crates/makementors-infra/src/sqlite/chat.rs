//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `makementors-core` using sqlx with split
//! read/write pools. Messages are ordered by created_at with the time-sortable
//! UUID v7 id as a tiebreaker, so same-millisecond writes keep insertion order.

use makementors_core::chat::repository::ChatRepository;
use makementors_types::chat::{ChatMessage, ChatSession, MentorKind, MessageRole};
use makementors_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::template::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    user_id: String,
    mentor_id: String,
    mentor_kind: String,
    name: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            mentor_id: row.try_get("mentor_id")?,
            mentor_kind: row.try_get("mentor_kind")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let mentor_kind: MentorKind = self
            .mentor_kind
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatSession {
            id,
            user_id: self.user_id,
            mentor_id: self.mentor_id,
            mentor_kind,
            name: self.name,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct ChatMessageRow {
    id: String,
    chat_session_id: String,
    user_id: Option<String>,
    role: String,
    content: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_session_id: row.try_get("chat_session_id")?,
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let chat_session_id = Uuid::parse_str(&self.chat_session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat_session_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id,
            chat_session_id,
            user_id: self.user_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, user_id, mentor_id, mentor_kind, name, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(&session.user_id)
        .bind(&session.mentor_id)
        .bind(session.mentor_kind.to_string())
        .bind(&session.name)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn touch_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&chrono::Utc::now()))
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut sql = String::from(
            "SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY updated_at DESC",
        );

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row = ChatSessionRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (id, chat_session_id, user_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_session_id.to_string())
        .bind(&message.user_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        // UUID v7 ids are time-sortable: same-timestamp rows keep write order.
        let mut sql = String::from(
            "SELECT * FROM chat_messages WHERE chat_session_id = ? ORDER BY created_at ASC, id ASC",
        );

        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_sessions")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_session(user_id: &str) -> ChatSession {
        let now = Utc::now();
        ChatSession {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            mentor_id: "crypto_day_trader_wyckoff_ta".to_string(),
            mentor_kind: MentorKind::Template,
            name: Some("Hello".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn make_message(session_id: Uuid, role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            chat_session_id: session_id,
            user_id: Some("user-1".to_string()),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let session = make_session("user-1");
        let created = repo.create_session(&session).await.unwrap();
        assert_eq!(created.id, session.id);

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, "user-1");
        assert_eq!(found.mentor_id, "crypto_day_trader_wyckoff_ta");
        assert_eq!(found.mentor_kind, MentorKind::Template);
        assert_eq!(found.name.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_touch_session_bumps_updated_at() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let mut session = make_session("user-1");
        session.updated_at = session.updated_at - chrono::Duration::seconds(30);
        session.created_at = session.updated_at;
        repo.create_session(&session).await.unwrap();

        repo.touch_session(&session.id).await.unwrap();
        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert!(found.updated_at > session.updated_at);
    }

    #[tokio::test]
    async fn test_list_sessions_for_user() {
        let repo = SqliteChatRepository::new(test_pool().await);

        for _ in 0..3 {
            repo.create_session(&make_session("user-1")).await.unwrap();
        }
        repo.create_session(&make_session("user-2")).await.unwrap();

        let all = repo
            .list_sessions_for_user("user-1", None, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let page = repo
            .list_sessions_for_user("user-1", Some(2), Some(0))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_session_cascades_messages() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let session = make_session("user-1");
        repo.create_session(&session).await.unwrap();
        repo.save_message(&make_message(session.id, MessageRole::User, "Hello"))
            .await
            .unwrap();

        repo.delete_session(&session.id).await.unwrap();

        assert!(repo.get_session(&session.id).await.unwrap().is_none());
        let messages = repo.get_messages(&session.id, None, None).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_messages_ordered_ascending() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let session = make_session("user-1");
        repo.create_session(&session).await.unwrap();

        repo.save_message(&make_message(session.id, MessageRole::Assistant, "Welcome!"))
            .await
            .unwrap();
        repo.save_message(&make_message(session.id, MessageRole::User, "Hello"))
            .await
            .unwrap();
        repo.save_message(&make_message(session.id, MessageRole::Assistant, "Hi there."))
            .await
            .unwrap();

        let messages = repo.get_messages(&session.id, None, None).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Welcome!", "Hello", "Hi there."]);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[1].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_message_requires_valid_session() {
        let repo = SqliteChatRepository::new(test_pool().await);

        // FK enforcement: a message referencing a missing session is rejected.
        let orphan = make_message(Uuid::now_v7(), MessageRole::User, "ghost");
        let result = repo.save_message(&orphan).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_counts() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let session = make_session("user-1");
        repo.create_session(&session).await.unwrap();
        repo.save_message(&make_message(session.id, MessageRole::User, "Hello"))
            .await
            .unwrap();

        assert_eq!(repo.count_sessions().await.unwrap(), 1);
        assert_eq!(repo.count_messages().await.unwrap(), 1);
    }
}
