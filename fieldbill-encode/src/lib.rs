//! Payload encoding for outbound deliveries.
//!
//! An encoder turns a submission plus its resolved channel configuration
//! into an [`EncodedInvoice`]: an ordered list of parts, one body plus one
//! part per attachment. Attachment handling is shared across encoders:
//! download from blob storage, enforce count and size limits, and invoke the
//! registered compressor when an attachment is oversized.

pub mod attachments;
pub mod blob;
pub mod encoder;
pub mod encoders;
pub mod error;
pub mod parts;

pub use attachments::{AttachmentCompressor, AttachmentPipeline};
pub use blob::{BlobError, BlobStore, MemoryBlobStore};
pub use encoder::{EncoderSelector, InvoiceEncoder};
pub use encoders::{CsvInvoiceEncoder, TemplatedPayloadEncoder};
pub use error::EncodeError;
pub use parts::{EncodedInvoice, EncodedPart};
