//! Catalog trait definitions for the two mentor identifier spaces.
//!
//! Templates and custom mentors are looked up through separate traits so the
//! resolver can match on the `MentorRef` variant instead of probing both
//! catalogs with a raw string. Uses native async fn in traits (RPITIT).

use makementors_types::error::RepositoryError;
use makementors_types::mentor::{Mentor, MentorId, MentorTemplate};

/// Read-only access to the administrator-curated template catalog.
///
/// Implementations live in makementors-infra (e.g., `SqliteTemplateCatalog`).
pub trait TemplateCatalog: Send + Sync {
    /// Get a template by its string id.
    fn get_template(
        &self,
        template_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<MentorTemplate>, RepositoryError>> + Send;

    /// List all templates, ordered by category then display name.
    fn list_templates(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<MentorTemplate>, RepositoryError>> + Send;
}

/// Persistence for user-created custom mentors.
pub trait MentorRepository: Send + Sync {
    /// Create a new custom mentor.
    fn create(
        &self,
        mentor: &Mentor,
    ) -> impl std::future::Future<Output = Result<Mentor, RepositoryError>> + Send;

    /// Get a custom mentor by id.
    fn get(
        &self,
        id: &MentorId,
    ) -> impl std::future::Future<Output = Result<Option<Mentor>, RepositoryError>> + Send;

    /// List the mentors owned by a user, newest first.
    fn list_for_owner(
        &self,
        owner_user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Mentor>, RepositoryError>> + Send;
}
