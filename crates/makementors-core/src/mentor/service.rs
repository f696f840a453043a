//! Mentor lifecycle service.
//!
//! Creating a mentor generates its system prompt once, at creation time;
//! the prompt is stored and never recomputed, so persona resolution reads
//! exactly what was written here.

use makementors_types::error::{MentorError, RepositoryError};
use makementors_types::mentor::{CreateMentorRequest, Mentor, MentorId, MentorTemplate};

use crate::mentor::repository::{MentorRepository, TemplateCatalog};

const DEFAULT_COLOR: &str = "#6366f1";
const DEFAULT_ICON: &str = "sparkles";

/// Build the stored system prompt for a custom mentor.
pub fn custom_system_prompt(name: &str, description: &str) -> String {
    format!("You are {name}. {description}")
}

/// Orchestrates mentor creation and catalog reads.
///
/// Generic over the catalog traits so makementors-core never depends on
/// makementors-infra.
pub struct MentorService<T: TemplateCatalog, M: MentorRepository> {
    templates: T,
    mentors: M,
}

impl<T: TemplateCatalog, M: MentorRepository> MentorService<T, M> {
    pub fn new(templates: T, mentors: M) -> Self {
        Self { templates, mentors }
    }

    /// Create a custom mentor owned by the requesting user.
    pub async fn create_mentor(&self, request: CreateMentorRequest) -> Result<Mentor, MentorError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(MentorError::InvalidName("name cannot be empty".to_string()));
        }

        let description = request.description.trim().to_string();
        let mentor = Mentor {
            id: MentorId::new(),
            owner_user_id: request.user_id,
            system_prompt: custom_system_prompt(&name, &description),
            name,
            description,
            color: request.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon: request.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            created_at: chrono::Utc::now(),
        };

        self.mentors
            .create(&mentor)
            .await
            .map_err(|e| MentorError::StorageError(e.to_string()))
    }

    /// Get a custom mentor by id.
    pub async fn get_mentor(&self, id: &MentorId) -> Result<Mentor, MentorError> {
        self.mentors
            .get(id)
            .await
            .map_err(|e| MentorError::StorageError(e.to_string()))?
            .ok_or(MentorError::NotFound)
    }

    /// List the mentors a user has created.
    pub async fn list_mentors(&self, owner_user_id: &str) -> Result<Vec<Mentor>, MentorError> {
        self.mentors
            .list_for_owner(owner_user_id)
            .await
            .map_err(|e| MentorError::StorageError(e.to_string()))
    }

    /// List the template catalog.
    pub async fn list_templates(&self) -> Result<Vec<MentorTemplate>, RepositoryError> {
        self.templates.list_templates().await
    }

    /// Get one template by id.
    pub async fn get_template(&self, template_id: &str) -> Result<MentorTemplate, MentorError> {
        self.templates
            .get_template(template_id)
            .await
            .map_err(|e| MentorError::StorageError(e.to_string()))?
            .ok_or(MentorError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryMentorRepository, InMemoryTemplateCatalog};

    fn service() -> MentorService<InMemoryTemplateCatalog, InMemoryMentorRepository> {
        MentorService::new(
            InMemoryTemplateCatalog::with(vec![]),
            InMemoryMentorRepository::with(vec![]),
        )
    }

    fn request(name: &str, description: &str) -> CreateMentorRequest {
        CreateMentorRequest {
            user_id: "user-1".to_string(),
            name: name.to_string(),
            description: description.to_string(),
            color: None,
            icon: None,
        }
    }

    #[tokio::test]
    async fn create_mentor_generates_prompt() {
        let svc = service();
        let mentor = svc
            .create_mentor(request("Iris", "A patient Rust tutor."))
            .await
            .unwrap();
        assert_eq!(mentor.system_prompt, "You are Iris. A patient Rust tutor.");
        assert_eq!(mentor.color, DEFAULT_COLOR);

        let found = svc.get_mentor(&mentor.id).await.unwrap();
        assert_eq!(found.name, "Iris");
    }

    #[tokio::test]
    async fn create_mentor_rejects_empty_name() {
        let svc = service();
        let err = svc.create_mentor(request("   ", "whatever")).await;
        assert!(matches!(err, Err(MentorError::InvalidName(_))));
    }

    #[tokio::test]
    async fn list_mentors_scoped_to_owner() {
        let svc = service();
        svc.create_mentor(request("Iris", "Tutor")).await.unwrap();

        let mine = svc.list_mentors("user-1").await.unwrap();
        assert_eq!(mine.len(), 1);
        let theirs = svc.list_mentors("user-2").await.unwrap();
        assert!(theirs.is_empty());
    }
}
