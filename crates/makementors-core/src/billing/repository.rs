//! SubscriberRepository trait definition.
//!
//! One row per user, written almost exclusively by webhook-driven upserts.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use makementors_types::billing::Subscriber;
use makementors_types::error::RepositoryError;

/// Persistence for subscriber/billing state.
///
/// Implementations live in makementors-infra (e.g., `SqliteSubscriberRepository`).
pub trait SubscriberRepository: Send + Sync {
    /// Insert or replace the subscriber row for `subscriber.user_id`.
    fn upsert(
        &self,
        subscriber: &Subscriber,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the subscriber row for a user.
    fn get(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Subscriber>, RepositoryError>> + Send;

    /// Find the subscriber owning a provider customer id.
    fn find_by_customer(
        &self,
        customer_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Subscriber>, RepositoryError>> + Send;
}
