//! System prompt assembly.
//!
//! The resolved persona prompt is augmented with the caller's profile as
//! plain text appended to the system turn. The same augmentation applies to
//! template and custom personas.

use makementors_types::mentor::UserProfile;

/// Append the user profile to a persona's system prompt.
///
/// Absent or empty profiles leave the prompt untouched.
pub fn apply_profile(system_prompt: &str, profile: Option<&UserProfile>) -> String {
    let Some(profile) = profile else {
        return system_prompt.to_string();
    };
    if profile.is_empty() {
        return system_prompt.to_string();
    }

    let mut out = String::from(system_prompt);
    out.push_str("\n\nAbout the user you are mentoring:");
    if let Some(name) = &profile.name {
        out.push_str(&format!("\n- Name: {name}"));
    }
    if let Some(goal) = &profile.goal {
        out.push_str(&format!("\n- Goal: {goal}"));
    }
    if let Some(level) = &profile.experience_level {
        out.push_str(&format!("\n- Experience level: {level}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_profile_returns_prompt_unchanged() {
        assert_eq!(apply_profile("You trade with Wyckoff.", None), "You trade with Wyckoff.");
        let empty = UserProfile::default();
        assert_eq!(
            apply_profile("You trade with Wyckoff.", Some(&empty)),
            "You trade with Wyckoff."
        );
    }

    #[test]
    fn full_profile_appends_all_fields() {
        let profile = UserProfile {
            name: Some("Ada".to_string()),
            goal: Some("learn swing trading".to_string()),
            experience_level: Some("beginner".to_string()),
        };
        let out = apply_profile("Base.", Some(&profile));
        assert!(out.starts_with("Base.\n\nAbout the user you are mentoring:"));
        assert!(out.contains("\n- Name: Ada"));
        assert!(out.contains("\n- Goal: learn swing trading"));
        assert!(out.contains("\n- Experience level: beginner"));
    }

    #[test]
    fn augmentation_is_identical_across_personas() {
        // The suffix appended to a template prompt and a custom prompt must
        // be byte-identical for the same profile.
        let profile = UserProfile {
            name: Some("Ada".to_string()),
            goal: None,
            experience_level: None,
        };
        let a = apply_profile("Template base", Some(&profile));
        let b = apply_profile("You are Iris. A tutor.", Some(&profile));
        let suffix_a = a.strip_prefix("Template base").unwrap();
        let suffix_b = b.strip_prefix("You are Iris. A tutor.").unwrap();
        assert_eq!(suffix_a, suffix_b);
    }

    #[test]
    fn partial_profile_skips_missing_fields() {
        let profile = UserProfile {
            name: None,
            goal: Some("ship a startup".to_string()),
            experience_level: None,
        };
        let out = apply_profile("Base.", Some(&profile));
        assert!(out.contains("- Goal: ship a startup"));
        assert!(!out.contains("- Name:"));
        assert!(!out.contains("- Experience level:"));
    }
}
