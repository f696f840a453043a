//! SQLite template catalog implementation.
//!
//! Implements `TemplateCatalog` from `makementors-core`. Templates are
//! written only by the seed command; the catalog trait itself is read-only.

use chrono::{DateTime, Utc};
use makementors_core::mentor::repository::TemplateCatalog;
use makementors_types::error::RepositoryError;
use makementors_types::mentor::MentorTemplate;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TemplateCatalog`.
pub struct SqliteTemplateCatalog {
    pool: DatabasePool,
}

impl SqliteTemplateCatalog {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Insert a template if its id is not already present.
    ///
    /// Used by the seed command; returns true when a row was written.
    pub async fn insert_if_absent(
        &self,
        template: &MentorTemplate,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO mentor_templates
               (template_id, display_name, category, description, icon, system_prompt_base, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&template.template_id)
        .bind(&template.display_name)
        .bind(&template.category)
        .bind(&template.description)
        .bind(&template.icon)
        .bind(&template.system_prompt_base)
        .bind(format_datetime(&template.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Internal row type for mapping SQLite rows to domain MentorTemplate.
struct TemplateRow {
    template_id: String,
    display_name: String,
    category: String,
    description: String,
    icon: String,
    system_prompt_base: String,
    created_at: String,
}

impl TemplateRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            template_id: row.try_get("template_id")?,
            display_name: row.try_get("display_name")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            icon: row.try_get("icon")?,
            system_prompt_base: row.try_get("system_prompt_base")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_template(self) -> Result<MentorTemplate, RepositoryError> {
        Ok(MentorTemplate {
            template_id: self.template_id,
            display_name: self.display_name,
            category: self.category,
            description: self.description,
            icon: self.icon,
            system_prompt_base: self.system_prompt_base,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl TemplateCatalog for SqliteTemplateCatalog {
    async fn get_template(
        &self,
        template_id: &str,
    ) -> Result<Option<MentorTemplate>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM mentor_templates WHERE template_id = ?")
            .bind(template_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let template_row = TemplateRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(template_row.into_template()?))
            }
            None => Ok(None),
        }
    }

    async fn list_templates(&self) -> Result<Vec<MentorTemplate>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM mentor_templates ORDER BY category, display_name")
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut templates = Vec::with_capacity(rows.len());
        for row in &rows {
            let template_row =
                TemplateRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            templates.push(template_row.into_template()?);
        }

        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_template(id: &str) -> MentorTemplate {
        MentorTemplate {
            template_id: id.to_string(),
            display_name: "Wyckoff Day Trader".to_string(),
            category: "finance".to_string(),
            description: "Crypto day trading via Wyckoff and TA".to_string(),
            icon: "chart".to_string(),
            system_prompt_base: "You are a crypto day trading mentor.".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_template() {
        let catalog = SqliteTemplateCatalog::new(test_pool().await);

        let template = make_template("crypto_day_trader_wyckoff_ta");
        let inserted = catalog.insert_if_absent(&template).await.unwrap();
        assert!(inserted);

        let found = catalog
            .get_template("crypto_day_trader_wyckoff_ta")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.display_name, "Wyckoff Day Trader");
        assert_eq!(found.system_prompt_base, "You are a crypto day trading mentor.");
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let catalog = SqliteTemplateCatalog::new(test_pool().await);

        let template = make_template("career_coach");
        assert!(catalog.insert_if_absent(&template).await.unwrap());
        assert!(!catalog.insert_if_absent(&template).await.unwrap());

        let all = catalog.list_templates().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_template_is_none() {
        let catalog = SqliteTemplateCatalog::new(test_pool().await);
        let found = catalog.get_template("ghost").await.unwrap();
        assert!(found.is_none());
    }
}
