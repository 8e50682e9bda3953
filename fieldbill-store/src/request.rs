//! The persisted record of one inbound delivery request.

use std::time::SystemTime;

use fieldbill_common::TicketSubmission;
use serde::{Deserialize, Serialize};

use crate::{Result, types::RequestId};

/// One inbound delivery request and its reconciliation state.
///
/// Created before the pipeline runs, mutated only by the orchestrator
/// (`is_processed`) and the reconciliation loop (`has_reached_final_status`),
/// and never deleted. A request with `is_processed` set and
/// `has_reached_final_status` clear is awaiting reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub id: RequestId,

    /// The original inbound message, kept opaque for auditability.
    pub payload: serde_json::Value,

    /// The pipeline has run at least once to completion for this request.
    pub is_processed: bool,

    /// No further reconciliation is needed for this request.
    pub has_reached_final_status: bool,

    pub received_at: SystemTime,
}

impl DeliveryRequest {
    /// Record a new, unprocessed request around an opaque payload.
    #[must_use]
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: RequestId::generate(),
            payload,
            is_processed: false,
            has_reached_final_status: false,
            received_at: SystemTime::now(),
        }
    }

    /// Deserialize the opaque payload into its typed form.
    ///
    /// # Errors
    /// Returns a serialization error when the payload does not match the
    /// submission shape.
    pub fn submission(&self) -> Result<TicketSubmission> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// Whether this request sits in the reconciliation work-queue.
    #[must_use]
    pub const fn is_awaiting_reconciliation(&self) -> bool {
        self.is_processed && !self.has_reached_final_status
    }
}

#[cfg(test)]
mod tests {
    use fieldbill_common::TicketKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn new_request_is_unprocessed() {
        let request = DeliveryRequest::new(json!({}));
        assert!(!request.is_processed);
        assert!(!request.has_reached_final_status);
        assert!(!request.is_awaiting_reconciliation());
    }

    #[test]
    fn reconciliation_queue_membership() {
        let mut request = DeliveryRequest::new(json!({}));
        request.is_processed = true;
        assert!(request.is_awaiting_reconciliation());

        request.has_reached_final_status = true;
        assert!(!request.is_awaiting_reconciliation());
    }

    #[test]
    fn payload_deserializes_into_submission() {
        let request = DeliveryRequest::new(json!({
            "platform": "wellsite",
            "customerId": "acme",
            "ticketNumber": "T-42",
            "kind": "invoice",
        }));

        let submission = request.submission().expect("typed payload");
        assert_eq!(submission.ticket_number, "T-42");
        assert_eq!(submission.kind, TicketKind::Invoice);
    }

    #[test]
    fn undecodable_payload_is_an_error() {
        let request = DeliveryRequest::new(json!({"unexpected": true}));
        assert!(request.submission().is_err());
    }
}
