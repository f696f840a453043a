//! REST API layer: router, error mapping, envelope responses, handlers.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
