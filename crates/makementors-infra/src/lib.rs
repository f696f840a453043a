//! Infrastructure implementations for MakeMentors.
//!
//! SQLite repositories (sqlx, WAL, split reader/writer pools), the
//! OpenAI-compatible LLM provider, the Stripe billing client and webhook
//! verification, configuration loading, and the built-in template seed.

pub mod billing;
pub mod config;
pub mod llm;
pub mod seed;
pub mod sqlite;
