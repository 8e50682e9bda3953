use fieldbill_common::{ChannelConfig, TicketSubmission};
use fieldbill_encode::EncodedInvoice;
use fieldbill_store::RequestId;

/// Everything a delivery attempt accumulates as it moves through the
/// pipeline. Enrichment and mapping mutate the submission in place; the
/// encoder fills in the encoded payload for the transport.
#[derive(Debug)]
pub struct DeliveryContext {
    pub request_id: RequestId,
    pub submission: TicketSubmission,

    /// The channel resolved for the submission's ticket kind.
    pub config: ChannelConfig,

    /// Whether the resolved configuration carries a field-ticket channel,
    /// echoed back in the delivery response.
    pub supports_field_tickets: bool,

    /// Set once encoding succeeds.
    pub encoded: Option<EncodedInvoice>,
}
