//! SQLite custom-mentor repository implementation.
//!
//! Implements `MentorRepository` from `makementors-core` using sqlx with
//! split read/write pools: raw queries, private Row structs.

use makementors_core::mentor::repository::MentorRepository;
use makementors_types::error::RepositoryError;
use makementors_types::mentor::{Mentor, MentorId};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::template::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `MentorRepository`.
pub struct SqliteMentorRepository {
    pool: DatabasePool,
}

impl SqliteMentorRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Mentor.
struct MentorRow {
    id: String,
    owner_user_id: String,
    name: String,
    description: String,
    color: String,
    icon: String,
    system_prompt: String,
    created_at: String,
}

impl MentorRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_user_id: row.try_get("owner_user_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            color: row.try_get("color")?,
            icon: row.try_get("icon")?,
            system_prompt: row.try_get("system_prompt")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_mentor(self) -> Result<Mentor, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid mentor id: {e}")))?;

        Ok(Mentor {
            id: MentorId::from_uuid(id),
            owner_user_id: self.owner_user_id,
            name: self.name,
            description: self.description,
            color: self.color,
            icon: self.icon,
            system_prompt: self.system_prompt,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl MentorRepository for SqliteMentorRepository {
    async fn create(&self, mentor: &Mentor) -> Result<Mentor, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO mentors (id, owner_user_id, name, description, color, icon, system_prompt, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(mentor.id.to_string())
        .bind(&mentor.owner_user_id)
        .bind(&mentor.name)
        .bind(&mentor.description)
        .bind(&mentor.color)
        .bind(&mentor.icon)
        .bind(&mentor.system_prompt)
        .bind(format_datetime(&mentor.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(mentor.clone())
    }

    async fn get(&self, id: &MentorId) -> Result<Option<Mentor>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM mentors WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let mentor_row =
                    MentorRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(mentor_row.into_mentor()?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_owner(&self, owner_user_id: &str) -> Result<Vec<Mentor>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM mentors WHERE owner_user_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut mentors = Vec::with_capacity(rows.len());
        for row in &rows {
            let mentor_row =
                MentorRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            mentors.push(mentor_row.into_mentor()?);
        }

        Ok(mentors)
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
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_mentor(owner: &str, name: &str) -> Mentor {
        Mentor {
            id: MentorId::new(),
            owner_user_id: owner.to_string(),
            name: name.to_string(),
            description: "A patient tutor.".to_string(),
            color: "#6366f1".to_string(),
            icon: "sparkles".to_string(),
            system_prompt: format!("You are {name}. A patient tutor."),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_mentor() {
        let repo = SqliteMentorRepository::new(test_pool().await);

        let mentor = make_mentor("user-1", "Iris");
        repo.create(&mentor).await.unwrap();

        let found = repo.get(&mentor.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Iris");
        assert_eq!(found.system_prompt, "You are Iris. A patient tutor.");
        assert_eq!(found.owner_user_id, "user-1");
    }

    #[tokio::test]
    async fn test_list_for_owner_excludes_other_users() {
        let repo = SqliteMentorRepository::new(test_pool().await);

        repo.create(&make_mentor("user-1", "Iris")).await.unwrap();
        repo.create(&make_mentor("user-1", "Sage")).await.unwrap();
        repo.create(&make_mentor("user-2", "Nyx")).await.unwrap();

        let mine = repo.list_for_owner("user-1").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|m| m.owner_user_id == "user-1"));
    }

    #[tokio::test]
    async fn test_get_missing_mentor_is_none() {
        let repo = SqliteMentorRepository::new(test_pool().await);
        let found = repo.get(&MentorId::new()).await.unwrap();
        assert!(found.is_none());
    }
}
