//! Client for the remote gateway's receipt query surface.
//!
//! The gateway exposes delivery receipts behind an OData-style query
//! interface over HTTPS, authenticated with a client certificate. This crate
//! owns query construction, transport, retry, and the typed receipt shapes
//! the reconciler consumes.

pub mod client;
pub mod error;
pub mod query;
pub mod receipt;

pub use client::{GatewayClient, GatewayConfig, ReceiptSource};
pub use error::GatewayError;
pub use query::receipt_query;
pub use receipt::{Receipt, ReceiptsResponse};
