//! Delimited flat-file encoding.

use std::sync::Arc;

use async_trait::async_trait;
use fieldbill_common::{AdapterType, ChannelConfig, FieldMapping, TicketSubmission};

use crate::{
    attachments::AttachmentPipeline,
    encoder::InvoiceEncoder,
    encoders::interpolate_expression,
    error::EncodeError,
    parts::{EncodedInvoice, EncodedPart},
};

/// Encodes a submission as a delimited flat file, one column per mapping in
/// position order.
pub struct CsvInvoiceEncoder {
    attachments: Arc<AttachmentPipeline>,
}

impl CsvInvoiceEncoder {
    #[must_use]
    pub fn new(attachments: Arc<AttachmentPipeline>) -> Self {
        Self { attachments }
    }

    /// Render one mapping's value. A constant wins over an expression, an
    /// expression over a source-field lookup. A mapping that resolves to
    /// nothing still occupies its column, as an empty value.
    fn value_for(submission: &TicketSubmission, mapping: &FieldMapping) -> String {
        if let Some(constant) = &mapping.constant {
            return constant.clone();
        }
        if let Some(expression) = &mapping.expression {
            return interpolate_expression(submission, expression);
        }
        submission.field(&mapping.source_field).unwrap_or_default()
    }

    fn quote(value: &str) -> String {
        format!("\"{}\"", value.replace('"', "\"\""))
    }

    fn render_row(values: &[String], quote_values: bool) -> String {
        let mut row = String::new();
        for (index, value) in values.iter().enumerate() {
            if index > 0 {
                row.push(',');
            }
            if quote_values {
                row.push_str(&Self::quote(value));
            } else {
                row.push_str(value);
            }
        }
        row
    }
}

#[async_trait]
impl InvoiceEncoder for CsvInvoiceEncoder {
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Csv
    }

    async fn encode(
        &self,
        submission: &TicketSubmission,
        config: &ChannelConfig,
    ) -> Result<EncodedInvoice, EncodeError> {
        let mappings = config.ordered_mappings();

        let mut lines = Vec::with_capacity(2);
        if config.adapter.include_header_row {
            let headers: Vec<String> = mappings
                .iter()
                .map(|m| {
                    m.destination_field
                        .clone()
                        .unwrap_or_else(|| m.source_field.clone())
                })
                .collect();
            lines.push(Self::render_row(&headers, config.adapter.quote_values));
        }

        let values: Vec<String> = mappings
            .iter()
            .map(|m| Self::value_for(submission, m))
            .collect();
        lines.push(Self::render_row(&values, config.adapter.quote_values));

        let mut parts = vec![EncodedPart::body(
            (lines.join("\n") + "\n").into_bytes(),
            "text/csv",
        )];
        parts.extend(
            self.attachments
                .encode_attachments(&config.adapter, &submission.attachments)
                .await?,
        );

        Ok(EncodedInvoice::new(parts))
    }
}
