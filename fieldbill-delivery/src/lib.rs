//! Delivery orchestration and receipt reconciliation.
//!
//! This crate wires the pipeline together:
//! - Track inbound submissions as persisted delivery requests
//! - Validate, configure, encode and transport each submission
//! - Report outcomes back to the source platform
//! - Reconcile delivered tickets against the gateway's receipts

pub mod context;
pub mod error;
pub mod processor;
pub mod reconcile;
pub mod traits;

pub use context::DeliveryContext;
pub use error::{DeliveryError, FatalError, RecoverableError, SystemError, TransportError};
pub use processor::DeliveryProcessor;
pub use reconcile::{ReconcileSummary, Reconciler, ReconcilerConfig};
pub use traits::{
    ConfigResolver, ContextEnricher, FieldMapper, RequestValidator, ResponseChannel,
    TransportStrategy,
};
