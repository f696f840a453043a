//! Persona resolution for the chat relay.
//!
//! A [`MentorRef`] is resolved against exactly one catalog, decided by its
//! variant. A miss in either catalog (or a lookup error) falls back to a
//! generic mentor persona; persona resolution never fails a chat request.

use tracing::warn;

use makementors_types::mentor::MentorRef;

use crate::mentor::repository::{MentorRepository, TemplateCatalog};

/// System prompt used when the referenced mentor cannot be found.
pub const GENERIC_MENTOR_PROMPT: &str =
    "You are a helpful mentor. Offer practical, encouraging guidance tailored to the user's questions.";

/// Display name used alongside the generic fallback prompt.
pub const GENERIC_MENTOR_NAME: &str = "Mentor";

/// A resolved persona: the mentor's display name and base system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPersona {
    pub mentor_name: String,
    pub system_prompt: String,
    /// True when the generic fallback was substituted for a missing mentor.
    pub fallback: bool,
}

/// Resolves mentor identities into personas, once per request.
pub struct PersonaResolver<T: TemplateCatalog, M: MentorRepository> {
    templates: T,
    mentors: M,
}

impl<T: TemplateCatalog, M: MentorRepository> PersonaResolver<T, M> {
    pub fn new(templates: T, mentors: M) -> Self {
        Self { templates, mentors }
    }

    /// Resolve a mentor reference to its persona.
    ///
    /// Template refs use the template's `system_prompt_base`; custom refs use
    /// the prompt stored at mentor creation (`"You are {name}. {description}"`).
    pub async fn resolve(&self, mentor: &MentorRef) -> ResolvedPersona {
        match mentor {
            MentorRef::Template(template_id) => {
                match self.templates.get_template(template_id).await {
                    Ok(Some(template)) => ResolvedPersona {
                        mentor_name: template.display_name,
                        system_prompt: template.system_prompt_base,
                        fallback: false,
                    },
                    Ok(None) => {
                        warn!(template_id = %template_id, "mentor template not found, using generic persona");
                        Self::generic()
                    }
                    Err(e) => {
                        warn!(template_id = %template_id, error = %e, "template lookup failed, using generic persona");
                        Self::generic()
                    }
                }
            }
            MentorRef::Custom(mentor_id) => match self.mentors.get(mentor_id).await {
                Ok(Some(custom)) => ResolvedPersona {
                    mentor_name: custom.name,
                    system_prompt: custom.system_prompt,
                    fallback: false,
                },
                Ok(None) => {
                    warn!(mentor_id = %mentor_id, "custom mentor not found, using generic persona");
                    Self::generic()
                }
                Err(e) => {
                    warn!(mentor_id = %mentor_id, error = %e, "custom mentor lookup failed, using generic persona");
                    Self::generic()
                }
            },
        }
    }

    fn generic() -> ResolvedPersona {
        ResolvedPersona {
            mentor_name: GENERIC_MENTOR_NAME.to_string(),
            system_prompt: GENERIC_MENTOR_PROMPT.to_string(),
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryMentorRepository, InMemoryTemplateCatalog};
    use makementors_types::mentor::{Mentor, MentorId, MentorTemplate};

    fn make_template(id: &str, prompt: &str) -> MentorTemplate {
        MentorTemplate {
            template_id: id.to_string(),
            display_name: "Wyckoff Day Trader".to_string(),
            category: "finance".to_string(),
            description: "Crypto day trading via Wyckoff and TA".to_string(),
            icon: "chart".to_string(),
            system_prompt_base: prompt.to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    fn make_mentor(name: &str, description: &str) -> Mentor {
        Mentor {
            id: MentorId::new(),
            owner_user_id: "user-1".to_string(),
            name: name.to_string(),
            description: description.to_string(),
            color: "#6366f1".to_string(),
            icon: "sparkles".to_string(),
            system_prompt: format!("You are {name}. {description}"),
            created_at: chrono::Utc::now(),
        }
    }

    fn resolver(
        templates: Vec<MentorTemplate>,
        mentors: Vec<Mentor>,
    ) -> PersonaResolver<InMemoryTemplateCatalog, InMemoryMentorRepository> {
        PersonaResolver::new(
            InMemoryTemplateCatalog::with(templates),
            InMemoryMentorRepository::with(mentors),
        )
    }

    #[tokio::test]
    async fn resolve_template_uses_prompt_base() {
        let template = make_template("crypto_day_trader_wyckoff_ta", "You trade with Wyckoff.");
        let r = resolver(vec![template], vec![]);

        let persona = r
            .resolve(&MentorRef::Template(
                "crypto_day_trader_wyckoff_ta".to_string(),
            ))
            .await;
        assert_eq!(persona.system_prompt, "You trade with Wyckoff.");
        assert!(!persona.fallback);
    }

    #[tokio::test]
    async fn resolve_custom_uses_stored_prompt() {
        let mentor = make_mentor("Iris", "A patient Rust tutor.");
        let id = mentor.id.clone();
        let r = resolver(vec![], vec![mentor]);

        let persona = r.resolve(&MentorRef::Custom(id)).await;
        assert_eq!(persona.system_prompt, "You are Iris. A patient Rust tutor.");
        assert_eq!(persona.mentor_name, "Iris");
        assert!(!persona.fallback);
    }

    #[tokio::test]
    async fn resolve_missing_template_falls_back() {
        let r = resolver(vec![], vec![]);
        let persona = r.resolve(&MentorRef::Template("ghost".to_string())).await;
        assert!(persona.fallback);
        assert_eq!(persona.system_prompt, GENERIC_MENTOR_PROMPT);
    }

    #[tokio::test]
    async fn resolve_missing_custom_falls_back() {
        let r = resolver(vec![], vec![]);
        let persona = r.resolve(&MentorRef::Custom(MentorId::new())).await;
        assert!(persona.fallback);
        assert_eq!(persona.mentor_name, GENERIC_MENTOR_NAME);
    }
}
