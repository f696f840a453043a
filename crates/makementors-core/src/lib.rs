//! Business logic for MakeMentors.
//!
//! This crate defines the repository traits and the services built on top of
//! them: mentor persona resolution, chat session persistence, the streamed
//! chat relay engine, and billing orchestration. Implementations of the
//! traits live in `makementors-infra`; this crate never depends on it.

pub mod billing;
pub mod chat;
pub mod llm;
pub mod mentor;
pub mod relay;

#[cfg(test)]
pub(crate) mod testing;
