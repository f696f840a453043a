//! Mentor persona types for MakeMentors.
//!
//! Two disjoint catalogs exist: administrator-curated templates (string ids)
//! and user-created custom mentors (UUID ids). [`MentorRef`] is the tagged
//! variant that distinguishes them exactly once at the boundary; everything
//! downstream matches on the variant instead of re-sniffing id shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a custom mentor, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MentorId(pub Uuid);

impl MentorId {
    /// Create a new MentorId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a MentorId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for MentorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MentorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MentorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Which catalog a mentor identifier belongs to.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (mentor_kind IN ('template', 'custom'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorKind {
    Template,
    Custom,
}

impl fmt::Display for MentorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MentorKind::Template => write!(f, "template"),
            MentorKind::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for MentorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "template" => Ok(MentorKind::Template),
            "custom" => Ok(MentorKind::Custom),
            other => Err(format!("invalid mentor kind: '{other}'")),
        }
    }
}

/// Tagged mentor identity, resolved once at the request boundary.
///
/// Template ids are human-readable strings (`crypto_day_trader_wyckoff_ta`);
/// custom mentor ids are UUIDs. The two spaces are disjoint, so a raw id is
/// classified by whether it parses as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum MentorRef {
    Template(String),
    Custom(MentorId),
}

impl MentorRef {
    /// Classify a raw identifier into the template or custom id space.
    pub fn classify(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(uuid) => MentorRef::Custom(MentorId(uuid)),
            Err(_) => MentorRef::Template(raw.to_string()),
        }
    }

    /// Reconstruct a ref from a stored (kind, id) column pair.
    pub fn from_parts(kind: MentorKind, id: &str) -> Result<Self, String> {
        match kind {
            MentorKind::Template => Ok(MentorRef::Template(id.to_string())),
            MentorKind::Custom => id
                .parse::<MentorId>()
                .map(MentorRef::Custom)
                .map_err(|e| format!("invalid custom mentor id '{id}': {e}")),
        }
    }

    pub fn kind(&self) -> MentorKind {
        match self {
            MentorRef::Template(_) => MentorKind::Template,
            MentorRef::Custom(_) => MentorKind::Custom,
        }
    }

    /// The raw identifier as stored in `chat_sessions.mentor_id`.
    pub fn id_str(&self) -> String {
        match self {
            MentorRef::Template(id) => id.clone(),
            MentorRef::Custom(id) => id.to_string(),
        }
    }
}

impl fmt::Display for MentorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_str())
    }
}

/// An administrator-curated persona catalog entry. Read-only to end users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorTemplate {
    pub template_id: String,
    pub display_name: String,
    pub category: String,
    pub description: String,
    pub icon: String,
    pub system_prompt_base: String,
    pub created_at: DateTime<Utc>,
}

/// A user-authored mentor persona, owned exclusively by its creator.
///
/// `system_prompt` is generated once at creation time and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentor {
    pub id: MentorId,
    pub owner_user_id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub system_prompt: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a custom mentor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMentorRequest {
    pub user_id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Optional per-user personalization appended to the system turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
}

impl UserProfile {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.goal.is_none() && self.experience_level.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentor_kind_roundtrip() {
        for kind in [MentorKind::Template, MentorKind::Custom] {
            let s = kind.to_string();
            let parsed: MentorKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_classify_uuid_is_custom() {
        let id = Uuid::now_v7();
        let r = MentorRef::classify(&id.to_string());
        assert_eq!(r, MentorRef::Custom(MentorId(id)));
        assert_eq!(r.kind(), MentorKind::Custom);
        assert_eq!(r.id_str(), id.to_string());
    }

    #[test]
    fn test_classify_string_is_template() {
        let r = MentorRef::classify("crypto_day_trader_wyckoff_ta");
        assert_eq!(
            r,
            MentorRef::Template("crypto_day_trader_wyckoff_ta".to_string())
        );
        assert_eq!(r.kind(), MentorKind::Template);
    }

    #[test]
    fn test_from_parts_rejects_bad_custom_id() {
        let err = MentorRef::from_parts(MentorKind::Custom, "not-a-uuid");
        assert!(err.is_err());

        let ok = MentorRef::from_parts(MentorKind::Template, "startup_founder").unwrap();
        assert_eq!(ok.id_str(), "startup_founder");
    }

    #[test]
    fn test_mentor_ref_serde_tagged() {
        let r = MentorRef::Template("career_coach".to_string());
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"kind":"template","id":"career_coach"}"#);
        let parsed: MentorRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, r);
    }

    #[test]
    fn test_user_profile_empty() {
        assert!(UserProfile::default().is_empty());
        let p = UserProfile {
            goal: Some("learn trading".to_string()),
            ..Default::default()
        };
        assert!(!p.is_empty());
    }

    #[test]
    fn test_user_profile_wire_names() {
        let json = r#"{"name":"Ada","goal":"ship a startup","experienceLevel":"beginner"}"#;
        let p: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p.experience_level.as_deref(), Some("beginner"));
    }
}
