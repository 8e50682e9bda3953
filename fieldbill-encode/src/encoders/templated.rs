//! Templated payload encoding.
//!
//! The channel's transport carries a payload template; encoding is token
//! interpolation against the submission. Used for JSON gateways today, but
//! the mechanism is format-agnostic.

use std::sync::Arc;

use async_trait::async_trait;
use fieldbill_common::{AdapterType, ChannelConfig, TicketSubmission};

use crate::{
    attachments::AttachmentPipeline,
    encoder::InvoiceEncoder,
    encoders::interpolate_expression,
    error::EncodeError,
    parts::{EncodedInvoice, EncodedPart},
};

pub struct TemplatedPayloadEncoder {
    attachments: Arc<AttachmentPipeline>,
    adapter_type: AdapterType,
    content_type: String,
}

impl TemplatedPayloadEncoder {
    #[must_use]
    pub fn json(attachments: Arc<AttachmentPipeline>) -> Self {
        Self {
            attachments,
            adapter_type: AdapterType::Json,
            content_type: "application/json".to_string(),
        }
    }

    #[must_use]
    pub fn xml(attachments: Arc<AttachmentPipeline>) -> Self {
        Self {
            attachments,
            adapter_type: AdapterType::Xml,
            content_type: "application/xml".to_string(),
        }
    }
}

#[async_trait]
impl InvoiceEncoder for TemplatedPayloadEncoder {
    fn adapter_type(&self) -> AdapterType {
        self.adapter_type
    }

    async fn encode(
        &self,
        submission: &TicketSubmission,
        config: &ChannelConfig,
    ) -> Result<EncodedInvoice, EncodeError> {
        let template = config
            .transport
            .payload_template
            .as_deref()
            .ok_or(EncodeError::MissingTemplate(self.adapter_type))?;

        let body = interpolate_expression(submission, template);

        let mut parts = vec![EncodedPart::body(
            body.into_bytes(),
            self.content_type.clone(),
        )];
        parts.extend(
            self.attachments
                .encode_attachments(&config.adapter, &submission.attachments)
                .await?,
        );

        Ok(EncodedInvoice::new(parts))
    }
}

#[cfg(test)]
mod tests {
    use fieldbill_common::{AdapterSettings, TicketKind, TransportSettings};

    use super::*;
    use crate::blob::MemoryBlobStore;

    fn config(template: Option<&str>) -> ChannelConfig {
        ChannelConfig {
            adapter_type: AdapterType::Json,
            polling: None,
            preprocessor: None,
            adapter: AdapterSettings::default(),
            transport: TransportSettings {
                payload_template: template.map(str::to_string),
                ..Default::default()
            },
            mappings: Arc::new(Vec::new()),
        }
    }

    fn submission() -> TicketSubmission {
        let mut fields = serde_json::Map::new();
        fields.insert("total".to_string(), serde_json::json!("125.00"));
        TicketSubmission {
            platform: "wellsite".to_string(),
            customer_id: "acme".to_string(),
            ticket_number: "T-1001".to_string(),
            kind: TicketKind::Invoice,
            fields,
            attachments: Vec::new(),
        }
    }

    fn encoder() -> TemplatedPayloadEncoder {
        TemplatedPayloadEncoder::json(Arc::new(AttachmentPipeline::new(Arc::new(
            MemoryBlobStore::new(),
        ))))
    }

    #[tokio::test]
    async fn interpolates_the_payload_template() {
        let config = config(Some(
            r#"{"ticket":"{{ticket:number}}","total":"{{field:total}}"}"#,
        ));

        let invoice = encoder().encode(&submission(), &config).await.expect("encode");
        let body = invoice.body().expect("body");
        assert_eq!(body.content_type, "application/json");
        assert_eq!(
            String::from_utf8(body.content.clone()).expect("utf8"),
            r#"{"ticket":"T-1001","total":"125.00"}"#
        );
    }

    #[tokio::test]
    async fn unresolvable_tokens_survive_verbatim() {
        let config = config(Some(r#"{"x":"{{field:missing}}"}"#));

        let invoice = encoder().encode(&submission(), &config).await.expect("encode");
        assert_eq!(
            String::from_utf8(invoice.body().expect("body").content.clone()).expect("utf8"),
            r#"{"x":"{{field:missing}}"}"#
        );
    }

    #[tokio::test]
    async fn missing_template_is_an_error() {
        let result = encoder().encode(&submission(), &config(None)).await;
        assert!(matches!(result, Err(EncodeError::MissingTemplate(_))));
    }

    #[tokio::test]
    async fn xml_variant_emits_an_xml_body() {
        let encoder = TemplatedPayloadEncoder::xml(Arc::new(AttachmentPipeline::new(Arc::new(
            MemoryBlobStore::new(),
        ))));
        assert_eq!(encoder.adapter_type(), AdapterType::Xml);

        let mut config = config(Some("<invoice ticket=\"{{ticket:number}}\"/>"));
        config.adapter_type = AdapterType::Xml;

        let invoice = encoder.encode(&submission(), &config).await.expect("encode");
        let body = invoice.body().expect("body");
        assert_eq!(body.content_type, "application/xml");
        assert_eq!(
            String::from_utf8(body.content.clone()).expect("utf8"),
            "<invoice ticket=\"T-1001\"/>"
        );
    }
}
