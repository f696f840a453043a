//! SQLite subscriber repository implementation.
//!
//! Implements `SubscriberRepository` from `makementors-core`. The table is
//! keyed by user_id and written via upsert, matching the webhook-driven
//! update model.

use makementors_core::billing::repository::SubscriberRepository;
use makementors_types::billing::Subscriber;
use makementors_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;
use super::template::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `SubscriberRepository`.
pub struct SqliteSubscriberRepository {
    pool: DatabasePool,
}

impl SqliteSubscriberRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Subscriber.
struct SubscriberRow {
    user_id: String,
    email: String,
    stripe_customer_id: Option<String>,
    subscribed: i64,
    subscription_tier: Option<String>,
    subscription_end: Option<String>,
    updated_at: String,
}

impl SubscriberRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
            stripe_customer_id: row.try_get("stripe_customer_id")?,
            subscribed: row.try_get("subscribed")?,
            subscription_tier: row.try_get("subscription_tier")?,
            subscription_end: row.try_get("subscription_end")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_subscriber(self) -> Result<Subscriber, RepositoryError> {
        let subscription_end = self
            .subscription_end
            .as_deref()
            .map(parse_datetime)
            .transpose()?;

        Ok(Subscriber {
            user_id: self.user_id,
            email: self.email,
            stripe_customer_id: self.stripe_customer_id,
            subscribed: self.subscribed != 0,
            subscription_tier: self.subscription_tier,
            subscription_end,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl SubscriberRepository for SqliteSubscriberRepository {
    async fn upsert(&self, subscriber: &Subscriber) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO subscribers (user_id, email, stripe_customer_id, subscribed, subscription_tier, subscription_end, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   email = excluded.email,
                   stripe_customer_id = excluded.stripe_customer_id,
                   subscribed = excluded.subscribed,
                   subscription_tier = excluded.subscription_tier,
                   subscription_end = excluded.subscription_end,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&subscriber.user_id)
        .bind(&subscriber.email)
        .bind(&subscriber.stripe_customer_id)
        .bind(subscriber.subscribed as i64)
        .bind(&subscriber.subscription_tier)
        .bind(subscriber.subscription_end.as_ref().map(format_datetime))
        .bind(format_datetime(&subscriber.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<Subscriber>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM subscribers WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let sub_row = SubscriberRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(sub_row.into_subscriber()?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscriber>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM subscribers WHERE stripe_customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let sub_row = SubscriberRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(sub_row.into_subscriber()?))
            }
            None => Ok(None),
        }
    }
}
