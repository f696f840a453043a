use thiserror::Error;

/// Errors related to mentor catalog operations.
#[derive(Debug, Error)]
pub enum MentorError {
    #[error("mentor not found")]
    NotFound,

    #[error("invalid mentor name: {0}")]
    InvalidName(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to billing operations.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("billing provider error: {0}")]
    Provider(String),

    #[error("webhook signature invalid")]
    SignatureInvalid,

    #[error("malformed webhook event: {0}")]
    MalformedEvent(String),

    #[error("user has no billing customer on record")]
    NoCustomer,

    #[error("billing is not configured")]
    NotConfigured,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in makementors-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
