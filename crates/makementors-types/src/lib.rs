//! Shared domain types for MakeMentors.
//!
//! This crate holds the data shapes used across the workspace: mentor
//! catalogs, chat sessions and messages, LLM wire types, billing records,
//! configuration, and error taxonomies. It has no I/O dependencies.

pub mod billing;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod mentor;
