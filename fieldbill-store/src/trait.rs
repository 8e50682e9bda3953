use async_trait::async_trait;

use crate::{Result, request::DeliveryRequest, types::RequestId};

/// Persistence abstraction for delivery requests.
///
/// The orchestrator and the reconciliation loop both go through this trait,
/// which keeps them testable against an in-memory backend. There is no
/// delete: the store is the audit trail.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Persist a new request.
    ///
    /// # Errors
    /// Fails when a request with the same ID already exists.
    async fn insert(&self, request: &DeliveryRequest) -> Result<()>;

    /// Load a request by ID.
    ///
    /// # Errors
    /// Fails with `NotFound` when the request does not exist.
    async fn load(&self, id: &RequestId) -> Result<DeliveryRequest>;

    /// Persist updated state for an existing request.
    ///
    /// # Errors
    /// Fails with `NotFound` when the request does not exist.
    async fn update(&self, request: &DeliveryRequest) -> Result<()>;

    /// Persist updated state for a group of requests as one batched write.
    ///
    /// Reconciliation updates a whole chunk at once to bound write
    /// amplification. Either every request in the batch exists and is
    /// written, or none is.
    ///
    /// # Errors
    /// Fails with `NotFound` when any request in the batch does not exist.
    async fn update_all(&self, requests: &[DeliveryRequest]) -> Result<()>;

    /// List all request IDs, ordered by arrival.
    async fn list(&self) -> Result<Vec<RequestId>>;

    /// The reconciliation work-queue: processed requests that have not yet
    /// reached a final status.
    async fn pending_reconciliation(&self) -> Result<Vec<DeliveryRequest>>;
}
