//! The typed shape of an inbound delivery request.
//!
//! A persisted delivery request holds an opaque payload; this module is the
//! typed view the pipeline deserializes it into.

use serde::{Deserialize, Serialize};

/// Which delivery sub-configuration a submission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketKind {
    Invoice,
    FieldTicket,
}

/// Reference to an already-rendered attachment in blob storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub container: String,
    pub path: String,
    pub content_type: String,
    pub file_name: String,
}

/// One inbound invoice or field-ticket submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSubmission {
    /// Source ticketing platform the submission originated from.
    pub platform: String,

    /// Billing account the delivery configuration is resolved for.
    pub customer_id: String,

    /// Identifier of the ticket in the remote system, used as the receipt
    /// number during reconciliation.
    pub ticket_number: String,

    pub kind: TicketKind,

    /// Domain data the enricher and mapper operate on. Encoders read mapped
    /// values out of this map by source field name.
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl TicketSubmission {
    /// String form of a mapped field, if present. Non-string JSON values are
    /// rendered with their JSON representation.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> TicketSubmission {
        let mut fields = serde_json::Map::new();
        fields.insert("total".to_string(), serde_json::json!(1234.5));
        fields.insert("currency".to_string(), serde_json::json!("USD"));
        TicketSubmission {
            platform: "wellsite".to_string(),
            customer_id: "acme".to_string(),
            ticket_number: "T-1001".to_string(),
            kind: TicketKind::Invoice,
            fields,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn field_access_renders_values() {
        let sub = submission();
        assert_eq!(sub.field("currency").as_deref(), Some("USD"));
        assert_eq!(sub.field("total").as_deref(), Some("1234.5"));
        assert_eq!(sub.field("missing"), None);
    }

    #[test]
    fn round_trips_through_json() {
        let sub = submission();
        let value = serde_json::to_value(&sub).expect("serialize");
        assert_eq!(value["customerId"], "acme");
        assert_eq!(value["kind"], "invoice");
        let back: TicketSubmission = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, sub);
    }
}
