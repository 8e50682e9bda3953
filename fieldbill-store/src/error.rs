//! Error types for the fieldbill-store crate.

use thiserror::Error;

use crate::RequestId;

/// Top-level store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request not found in the store.
    #[error("Request not found: {0}")]
    NotFound(RequestId),

    /// The opaque payload could not be serialized or deserialized.
    #[error("Payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request already exists in the store.
    #[error("Request already exists: {0}")]
    AlreadyExists(RequestId),

    /// Internal error (lock poisoning, capacity, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// Convenience conversion for lock poisoning
impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}
