//! Typed error handling for delivery operations.
//!
//! Errors are categorized by what the pipeline does with the request
//! afterwards:
//! - Recoverable: the submission was never attempted; the request stays
//!   unprocessed and a later run picks it up again.
//! - Fatal: delivery was attempted and failed; the request is marked
//!   processed so it is not retried blindly.
//! - System: infrastructure failure outside the delivery semantics.

use fieldbill_common::AdapterType;
use fieldbill_encode::EncodeError;
use fieldbill_store::{RequestId, StoreError};
use thiserror::Error;

/// Top-level delivery error type.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Recoverable failure: {0}")]
    Recoverable(#[from] RecoverableError),

    #[error("Fatal failure: {0}")]
    Fatal(#[from] FatalError),

    #[error("System error: {0}")]
    System(#[from] SystemError),
}

/// Failures detected before any delivery attempt. The request remains
/// unprocessed.
#[derive(Debug, Error)]
pub enum RecoverableError {
    /// The submission failed validation.
    #[error("Submission is invalid: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// No delivery configuration is registered for the submission's
    /// platform and customer.
    #[error("No delivery configuration for platform {platform}, customer {customer_id}")]
    NoConfiguration {
        platform: String,
        customer_id: String,
    },
}

/// Failures during an actual delivery attempt. The request is marked
/// processed even though delivery failed.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    #[error("Field mapping failed: {0}")]
    Mapping(String),

    /// An encoder exists for the adapter type but no transport does.
    #[error("No transport registered for adapter type: {0}")]
    NoTransport(AdapterType),
}

/// Errors from the sending side of a transport strategy.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The payload could not be handed to the remote endpoint.
    #[error("Send failed: {0}")]
    Send(String),

    /// The remote endpoint received the payload and rejected it.
    #[error("Remote rejected the payload")]
    Rejected { detail: String },
}

/// Infrastructure failures outside the delivery semantics.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Delivery request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Store operation failed: {0}")]
    Store(StoreError),

    #[error("Persisted payload is not a valid submission: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl From<StoreError> for SystemError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::RequestNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<StoreError> for DeliveryError {
    fn from(e: StoreError) -> Self {
        Self::System(SystemError::from(e))
    }
}

impl DeliveryError {
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }

    /// Secondary detail carried into the delivery response, when the
    /// failure has one. Today that is the remote endpoint's rejection
    /// detail.
    #[must_use]
    pub fn additional_detail(&self) -> Option<String> {
        match self {
            Self::Fatal(FatalError::Transport(TransportError::Rejected { detail })) => {
                Some(detail.clone())
            }
            _ => None,
        }
    }
}
