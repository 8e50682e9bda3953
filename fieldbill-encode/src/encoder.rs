use std::sync::Arc;

use async_trait::async_trait;
use fieldbill_common::{AdapterType, ChannelConfig, TicketSubmission};

use crate::{error::EncodeError, parts::EncodedInvoice};

/// Turns a submission into the wire representation a channel expects.
#[async_trait]
pub trait InvoiceEncoder: Send + Sync {
    /// The adapter type this encoder produces.
    fn adapter_type(&self) -> AdapterType;

    /// Encode the submission's body and attachments for the channel.
    ///
    /// # Errors
    /// Fails when the submission cannot be rendered for the channel or an
    /// attachment cannot be prepared.
    async fn encode(
        &self,
        submission: &TicketSubmission,
        config: &ChannelConfig,
    ) -> Result<EncodedInvoice, EncodeError>;
}

/// Picks the encoder matching a channel's adapter type.
#[derive(Default)]
pub struct EncoderSelector {
    encoders: Vec<Arc<dyn InvoiceEncoder>>,
}

impl EncoderSelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn InvoiceEncoder>) -> Self {
        self.encoders.push(encoder);
        self
    }

    /// Select the encoder for an adapter type by exact match.
    ///
    /// # Errors
    /// Fails when no registered encoder handles the adapter type.
    pub fn select(&self, adapter_type: AdapterType) -> Result<&dyn InvoiceEncoder, EncodeError> {
        self.encoders
            .iter()
            .find(|encoder| encoder.adapter_type() == adapter_type)
            .map(AsRef::as_ref)
            .ok_or(EncodeError::UnsupportedAdapter(adapter_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubEncoder(AdapterType);

    #[async_trait]
    impl InvoiceEncoder for StubEncoder {
        fn adapter_type(&self) -> AdapterType {
            self.0
        }

        async fn encode(
            &self,
            _submission: &TicketSubmission,
            _config: &ChannelConfig,
        ) -> Result<EncodedInvoice, EncodeError> {
            Ok(EncodedInvoice { parts: Vec::new() })
        }
    }

    #[test]
    fn selects_by_exact_adapter_type() {
        let selector = EncoderSelector::new()
            .with_encoder(Arc::new(StubEncoder(AdapterType::Csv)))
            .with_encoder(Arc::new(StubEncoder(AdapterType::Json)));

        let encoder = selector.select(AdapterType::Json).expect("select");
        assert_eq!(encoder.adapter_type(), AdapterType::Json);
    }

    #[test]
    fn unknown_adapter_type_is_rejected() {
        let selector = EncoderSelector::new().with_encoder(Arc::new(StubEncoder(AdapterType::Csv)));

        let Err(err) = selector.select(AdapterType::Xml) else {
            panic!("expected selection to fail");
        };
        assert_eq!(err.to_string(), "Message adapter type not supported: xml");
    }
}
