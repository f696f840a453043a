//! LlmProvider trait definition.
//!
//! The abstraction the chat relay streams through. Uses native async fn in
//! traits (RPITIT, Rust 2024 edition) for `complete`; `stream` returns a
//! boxed stream so callers can hold it across await points without naming
//! the concrete stream type.

use std::pin::Pin;

use futures_util::Stream;

use makementors_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent};

/// Trait for LLM chat-completion backends.
///
/// Implementations live in makementors-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
