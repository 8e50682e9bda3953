//! Attachment handling shared by every concrete encoder.
//!
//! Downloads attachments from blob storage, enforces the adapter's count and
//! size limits, and attempts compression for oversized attachments that have
//! a registered compressor. Compression is a best-effort shrink, not a
//! guarantee: whatever bytes survive the attempt must still fit under the
//! adapter's ceiling or the whole encode fails.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use fieldbill_common::{AdapterSettings, AttachmentRef};
use fieldbill_compress::{CompressError, DocumentCompressor};
use tracing::debug;

use crate::{
    blob::BlobStore,
    error::EncodeError,
    parts::EncodedPart,
};

/// Shrinks one attachment's bytes. Keyed by content type in the pipeline.
#[async_trait]
pub trait AttachmentCompressor: Send + Sync {
    /// Attempt to produce a smaller representation of `bytes`.
    ///
    /// # Errors
    /// Fails when the attachment cannot be processed at all. Errors
    /// propagate to the encode operation; they are not swallowed here.
    async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, CompressError>;
}

/// The document compressor doubles as the attachment compressor for PDF
/// content types.
#[async_trait]
impl AttachmentCompressor for DocumentCompressor {
    async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, CompressError> {
        Self::compress(self, bytes).await
    }
}

/// Shared attachment encoding behavior consumed by all concrete encoders.
pub struct AttachmentPipeline {
    blob: Arc<dyn BlobStore>,
    compressors: HashMap<String, Arc<dyn AttachmentCompressor>>,
    /// Feature toggle: when false, oversized attachments are never
    /// compressed and must fit under the ceiling as-is.
    compression_enabled: bool,
}

impl AttachmentPipeline {
    #[must_use]
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self {
            blob,
            compressors: HashMap::new(),
            compression_enabled: true,
        }
    }

    /// Register a compressor for a content type.
    #[must_use]
    pub fn with_compressor(
        mut self,
        content_type: impl Into<String>,
        compressor: Arc<dyn AttachmentCompressor>,
    ) -> Self {
        self.compressors.insert(content_type.into(), compressor);
        self
    }

    /// Disable compression globally, regardless of registrations.
    #[must_use]
    pub const fn with_compression_disabled(mut self) -> Self {
        self.compression_enabled = false;
        self
    }

    /// Download, size-check and encode every attachment of a submission.
    ///
    /// # Errors
    /// Fails when the adapter's attachment count is exceeded, when a blob
    /// cannot be downloaded, when compression fails, or when an attachment
    /// remains over the ceiling after the optional compression attempt.
    pub async fn encode_attachments(
        &self,
        settings: &AdapterSettings,
        attachments: &[AttachmentRef],
    ) -> Result<Vec<EncodedPart>, EncodeError> {
        if !settings.supports_attachments || attachments.is_empty() {
            return Ok(Vec::new());
        }

        if settings.single_attachment_only && attachments.len() > 1 {
            return Err(EncodeError::TooManyAttachments {
                limit: 1,
                actual: attachments.len(),
            });
        }

        let max_bytes = settings.max_attachment_bytes();
        let mut parts = Vec::with_capacity(attachments.len());

        for attachment in attachments {
            let bytes = self
                .blob
                .download(&attachment.container, &attachment.path)
                .await?;

            let bytes = if bytes.len() as u64 > max_bytes
                && self.compression_enabled
                && let Some(compressor) = self.compressors.get(&attachment.content_type)
            {
                debug!(
                    file_name = %attachment.file_name,
                    size = bytes.len(),
                    max_bytes = max_bytes,
                    "Attachment exceeds size limit, attempting compression"
                );
                compressor.compress(&bytes).await?
            } else {
                bytes
            };

            // Compression is best-effort; the ceiling is not.
            if bytes.len() as u64 > max_bytes {
                return Err(EncodeError::AttachmentTooLarge {
                    name: attachment.file_name.clone(),
                    size: bytes.len() as u64,
                    max: max_bytes,
                });
            }

            parts.push(EncodedPart {
                content: bytes,
                content_type: attachment.content_type.clone(),
                is_attachment: true,
                source: format!("{}/{}", attachment.container, attachment.path),
                file_name: Some(attachment.file_name.clone()),
            });
        }

        Ok(parts)
    }
}
