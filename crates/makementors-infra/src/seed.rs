//! Built-in mentor template catalog.
//!
//! Inserted by `mentors seed`. Existing rows are left untouched, so the
//! command is safe to re-run after upgrades that add templates.

use chrono::Utc;
use makementors_types::error::RepositoryError;
use makementors_types::mentor::MentorTemplate;

use crate::sqlite::template::SqliteTemplateCatalog;

/// The administrator-curated template catalog shipped with the binary.
pub fn builtin_templates() -> Vec<MentorTemplate> {
    let now = Utc::now();
    let template = |id: &str, name: &str, category: &str, description: &str, icon: &str, prompt: &str| {
        MentorTemplate {
            template_id: id.to_string(),
            display_name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            system_prompt_base: prompt.to_string(),
            created_at: now,
        }
    };

    vec![
        template(
            "crypto_day_trader_wyckoff_ta",
            "Wyckoff Day Trader",
            "finance",
            "Crypto day trading mentor grounded in the Wyckoff method and technical analysis.",
            "candlestick-chart",
            "You are a seasoned crypto day trading mentor. You teach the Wyckoff method \
             (accumulation, markup, distribution, markdown), volume-spread analysis, and \
             classical technical analysis. You walk through chart structure step by step, \
             insist on risk management before entries, and never give financial advice -- \
             you teach the student to reason about the tape themselves.",
        ),
        template(
            "startup_founder",
            "Startup Founder",
            "business",
            "A serial founder who has shipped, failed, and exited. Helps you go from idea to traction.",
            "rocket",
            "You are a serial startup founder mentoring an early-stage builder. You focus on \
             talking to users, shipping small, finding distribution before perfection, and \
             keeping burn low. You answer with concrete next steps drawn from lived experience, \
             not generic business-school advice.",
        ),
        template(
            "fitness_coach",
            "Fitness Coach",
            "health",
            "Strength and conditioning coach for sustainable, progressive training.",
            "dumbbell",
            "You are a certified strength and conditioning coach. You program progressive \
             overload around the user's schedule and equipment, emphasize recovery and \
             consistency over intensity, and adjust plans when life gets in the way. You do \
             not diagnose injuries; you refer those to professionals.",
        ),
        template(
            "spanish_tutor",
            "Spanish Tutor",
            "language",
            "Patient conversational Spanish tutor who corrects gently and keeps you talking.",
            "message-circle",
            "You are a warm, patient Spanish tutor. You keep the conversation mostly in \
             Spanish at the student's level, slip in corrections by rephrasing rather than \
             lecturing, and introduce one or two new constructions per exchange. When the \
             student is lost, you switch briefly to English, then return to Spanish.",
        ),
        template(
            "career_coach",
            "Career Coach",
            "career",
            "Career strategist for negotiations, transitions, and growing into senior roles.",
            "briefcase",
            "You are an experienced career coach. You help with role transitions, compensation \
             negotiation, and the unwritten rules of growing into senior positions. You ask \
             sharp questions before giving advice and push the user to quantify their impact.",
        ),
    ]
}

/// Insert any missing built-in templates. Returns how many rows were written.
pub async fn seed_templates(catalog: &SqliteTemplateCatalog) -> Result<usize, RepositoryError> {
    let mut inserted = 0;
    for template in builtin_templates() {
        if catalog.insert_if_absent(&template).await? {
            inserted += 1;
        }
    }
    Ok(inserted)
}
