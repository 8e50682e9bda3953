//! Persisted store of delivery requests.
//!
//! Every inbound delivery attempt is recorded here before the pipeline runs.
//! Records are never deleted: the store is the audit trail and, through the
//! `is_processed && !has_reached_final_status` view, the reconciliation
//! work-queue at the same time.

pub mod backends;
pub mod error;
pub mod request;
pub mod r#trait;
pub mod types;

pub use backends::MemoryRequestStore;
pub use error::{Result, StoreError};
pub use request::DeliveryRequest;
pub use r#trait::RequestStore;
pub use types::RequestId;
