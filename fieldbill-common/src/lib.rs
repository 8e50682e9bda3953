pub mod config;
pub mod response;
pub mod status;
pub mod submission;
pub mod template;

pub use tracing;

pub use config::{
    AdapterSettings, AdapterType, ChannelConfig, ChannelOverride, ConfigScope, DeliveryConfigNode,
    FieldMapping, MappingPlacement, PollingStrategy, ResolvedDelivery, TransportSettings, resolve,
};
pub use response::DeliveryResponse;
pub use status::{OutwardStatus, ReceiptStatus};
pub use submission::{AttachmentRef, TicketKind, TicketSubmission};
