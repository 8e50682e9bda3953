//! The seams the orchestrator is assembled from.

use async_trait::async_trait;
use fieldbill_common::{DeliveryResponse, ResolvedDelivery, TicketSubmission};
use fieldbill_store::RequestId;

use crate::{context::DeliveryContext, error::TransportError};

/// Sends an encoded payload to the remote endpoint.
#[async_trait]
pub trait TransportStrategy: Send + Sync {
    /// Deliver the context's encoded payload.
    ///
    /// # Errors
    /// [`TransportError::Send`] when the payload never reached the
    /// endpoint, [`TransportError::Rejected`] when the endpoint refused it.
    async fn send(&self, context: &DeliveryContext) -> Result<(), TransportError>;
}

/// Checks a submission before any delivery work happens.
pub trait RequestValidator: Send + Sync {
    /// All validation problems with the submission, empty when valid.
    fn validate(&self, submission: &TicketSubmission) -> Vec<String>;
}

/// Looks up delivery configuration for a platform and customer.
#[async_trait]
pub trait ConfigResolver: Send + Sync {
    /// The resolved configuration, or `None` when the customer has no
    /// delivery set up on the platform.
    async fn resolve(&self, platform: &str, customer_id: &str) -> Option<ResolvedDelivery>;
}

/// Augments a submission with data the source platform did not include.
#[async_trait]
pub trait ContextEnricher: Send + Sync {
    /// # Errors
    /// Fails when required enrichment data cannot be obtained.
    async fn enrich(&self, context: &mut DeliveryContext) -> anyhow::Result<()>;
}

/// Applies the channel's field mappings to the submission.
#[async_trait]
pub trait FieldMapper: Send + Sync {
    /// # Errors
    /// Fails when a mapping cannot be applied.
    async fn map(&self, context: &mut DeliveryContext) -> anyhow::Result<()>;
}

/// Carries delivery responses back to the source platform.
#[async_trait]
pub trait ResponseChannel: Send + Sync {
    /// # Errors
    /// Fails when the response cannot be handed off. The pipeline logs
    /// these failures and continues; responses are best effort.
    async fn send(&self, request_id: &RequestId, response: DeliveryResponse) -> anyhow::Result<()>;
}
