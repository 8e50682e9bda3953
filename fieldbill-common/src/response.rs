//! The asynchronous response envelope sent back to the original sender.
//!
//! Every pipeline outcome, successful or not, surfaces to the sender as one
//! of these envelopes on the outbound response channel. The pipeline never
//! surfaces a synchronous error to the original caller.

use serde::{Deserialize, Serialize};

use crate::status::OutwardStatus;

/// Outcome of one delivery attempt or status update, as seen by the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub is_successful: bool,

    /// Human-readable description of the outcome. Carries the failure message
    /// when `is_successful` is false.
    #[serde(default)]
    pub message: String,

    /// Domain-specific failure detail, present only when the underlying error
    /// carried one (e.g. a gateway rejection reason).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub additional_message: Option<String>,

    /// True for asynchronous reconciliation updates, false for the immediate
    /// response to a submission.
    #[serde(default)]
    pub is_status_update: bool,

    #[serde(default)]
    pub remote_status: OutwardStatus,

    /// Capability echoes so the sender knows whether to expect asynchronous
    /// follow-up for this configuration.
    #[serde(default)]
    pub is_field_ticket_submission_supported: bool,
    #[serde(default)]
    pub is_field_ticket_status_updates_supported: bool,
}

impl DeliveryResponse {
    /// Response for a delivery that reached the remote gateway.
    #[must_use]
    pub fn success(supports_field_tickets: bool, supports_status_polling: bool) -> Self {
        Self {
            is_successful: true,
            message: String::new(),
            additional_message: None,
            is_status_update: false,
            remote_status: OutwardStatus::None,
            is_field_ticket_submission_supported: supports_field_tickets,
            is_field_ticket_status_updates_supported: supports_status_polling,
        }
    }

    /// Response for a delivery that failed at any stage of the pipeline.
    #[must_use]
    pub fn failure(
        message: impl Into<String>,
        additional_message: Option<String>,
        supports_field_tickets: bool,
        supports_status_polling: bool,
    ) -> Self {
        Self {
            is_successful: false,
            message: message.into(),
            additional_message,
            is_status_update: false,
            remote_status: OutwardStatus::None,
            is_field_ticket_submission_supported: supports_field_tickets,
            is_field_ticket_status_updates_supported: supports_status_polling,
        }
    }

    /// Asynchronous status update produced by reconciliation.
    #[must_use]
    pub fn status_update(status: OutwardStatus) -> Self {
        Self {
            is_successful: true,
            message: String::new(),
            additional_message: None,
            is_status_update: true,
            remote_status: status,
            is_field_ticket_submission_supported: false,
            is_field_ticket_status_updates_supported: false,
        }
    }
}
