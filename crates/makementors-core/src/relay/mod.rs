//! The streamed chat relay: session resolution, persona assembly, token
//! stream forwarding, and final-message persistence.

pub mod engine;
pub mod prompt;

pub use engine::{RelayCompletion, RelayEngine, RelayEvent, RelayOptions, RelayRequest, FALLBACK_RESPONSE};
