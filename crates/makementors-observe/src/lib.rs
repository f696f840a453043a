//! Observability setup for MakeMentors: tracing subscriber initialization
//! and GenAI span attribute constants.

pub mod genai_attrs;
pub mod tracing_setup;
