//! Error types for payload encoding.
//!
//! All encoding failures are fatal to the single request being encoded; the
//! orchestrator catches them, responds to the sender, and marks the request
//! processed.

use fieldbill_common::AdapterType;
use thiserror::Error;

use crate::blob::BlobError;

/// Top-level encode error type.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// No encoder is registered for the configured adapter type.
    #[error("Message adapter type not supported: {0}")]
    UnsupportedAdapter(AdapterType),

    /// The adapter accepts fewer attachments than the submission carries.
    #[error("Too many attachments: adapter accepts {limit}, submission has {actual}")]
    TooManyAttachments { limit: usize, actual: usize },

    /// An attachment exceeds the adapter's size ceiling even after the
    /// optional compression attempt.
    #[error("Attachment '{name}' is {size} bytes, exceeding the {max} byte limit")]
    AttachmentTooLarge { name: String, size: u64, max: u64 },

    /// Downloading an attachment from blob storage failed.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Compressing an oversized attachment failed. Not swallowed at this
    /// layer: a broken document should fail the encode, not ship oversized.
    #[error("Attachment compression failed: {0}")]
    Compression(#[from] fieldbill_compress::CompressError),

    /// The adapter requires a payload template but none is configured.
    #[error("No payload template configured for adapter type: {0}")]
    MissingTemplate(AdapterType),
}
