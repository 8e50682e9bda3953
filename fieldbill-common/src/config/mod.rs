//! The hierarchical delivery configuration data model.
//!
//! Delivery settings form a tree: a global root with descendants scoped by
//! business stream, legal entity, and billing account. Each node carries two
//! independent sub-configurations, one for invoice delivery and one for
//! field-ticket delivery. Resolution merges a child into its parent with
//! [`resolve`], always producing a new value; configuration editing lives
//! outside this pipeline, which only consumes the resolved shape.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The enum selecting which concrete encoder/transport pairing handles a
/// delivery. Encoder selection is an exact match on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdapterType {
    /// Delimited flat-file payload, typically posted as the message body.
    Csv,
    /// Templated JSON payload materialized from field mappings.
    Json,
    /// Templated XML payload materialized from field mappings.
    Xml,
}

impl core::fmt::Display for AdapterType {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Csv => write!(fmt, "csv"),
            Self::Json => write!(fmt, "json"),
            Self::Xml => write!(fmt, "xml"),
        }
    }
}

/// How delivery status is obtained from the remote gateway, when it is
/// obtainable at all. A channel without a strategy cannot be polled and its
/// requests never wait for reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PollingStrategy {
    /// Periodic batched receipt queries against the gateway.
    ReceiptQuery,
    /// The gateway pushes status callbacks; reconciliation is passive.
    StatusCallback,
}

/// Where a mapped field lands in the outbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingPlacement {
    Header,
    Line,
    Attachment,
}

/// One source-to-destination field mapping, ordered by `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source_field: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub destination_field: Option<String>,

    /// Format string applied to the source value.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub format: Option<String>,

    /// Constant value emitted instead of a source lookup.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub constant: Option<String>,

    /// Template expression evaluated against the submission.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expression: Option<String>,

    #[serde(default = "defaults::placement")]
    pub placement: MappingPlacement,

    #[serde(default)]
    pub position: u32,
}

/// Settings governing how the encoder assembles the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterSettings {
    #[serde(default)]
    pub include_header_row: bool,

    #[serde(default)]
    pub supports_attachments: bool,

    /// Some gateways accept at most one attachment per submission.
    #[serde(default)]
    pub single_attachment_only: bool,

    #[serde(default = "defaults::max_attachment_size_mb")]
    pub max_attachment_size_mb: u64,

    #[serde(default)]
    pub quote_values: bool,
}

impl AdapterSettings {
    /// The hard ceiling on a single encoded attachment, in bytes.
    #[must_use]
    pub const fn max_attachment_bytes(&self) -> u64 {
        self.max_attachment_size_mb * 1024 * 1024
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            include_header_row: false,
            supports_attachments: false,
            single_attachment_only: false,
            max_attachment_size_mb: defaults::max_attachment_size_mb(),
            quote_values: false,
        }
    }
}

/// Settings passed through to the transport strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportSettings {
    pub endpoint: String,

    #[serde(default = "defaults::verb")]
    pub verb: String,

    /// Header templates, interpolated before sending.
    #[serde(default)]
    pub headers: Vec<(String, String)>,

    /// Reference to client credentials held by the certificate store.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub certificate_ref: Option<String>,

    /// Body template, interpolated from field mappings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload_template: Option<String>,
}

/// A fully resolved delivery channel, the shape the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub adapter_type: AdapterType,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub polling: Option<PollingStrategy>,

    /// Pre-processor expression; `None` means the pre-processor is disabled.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preprocessor: Option<String>,

    pub adapter: AdapterSettings,
    pub transport: TransportSettings,

    /// Shared with the parent node when inherited by reference.
    pub mappings: Arc<Vec<FieldMapping>>,
}

impl ChannelConfig {
    /// Whether this channel can be asked for delivery status after the fact.
    #[must_use]
    pub const fn supports_status_polling(&self) -> bool {
        self.polling.is_some()
    }

    /// Mappings ordered by position, for encoders that emit columns.
    #[must_use]
    pub fn ordered_mappings(&self) -> Vec<&FieldMapping> {
        let mut mappings: Vec<&FieldMapping> = self.mappings.iter().collect();
        mappings.sort_by_key(|m| m.position);
        mappings
    }
}

/// A child node's sparse overrides against an already-resolved parent.
///
/// `None` means "inherit from the parent". Sub-structures are overwritten
/// whole, never merged field-by-field; a mapping list in particular is either
/// replaced outright or inherited, never partially merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelOverride {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub adapter_type: Option<AdapterType>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub polling: Option<PollingStrategy>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preprocessor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub adapter: Option<AdapterSettings>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transport: Option<TransportSettings>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mappings: Option<Vec<FieldMapping>>,
}

/// Merge a child's overrides into a resolved parent, producing a new value.
///
/// Scalar fields present on the child overwrite the parent's. The mapping
/// list is special-cased: when the child declares none, `include_mappings`
/// selects between inheriting the parent's list by reference (the resolved
/// child aliases the same data) or deep-cloning it (for materializing a full
/// new configuration). The parent is never mutated, which keeps sibling
/// nodes from aliasing each other's scalar state.
#[must_use]
pub fn resolve(parent: &ChannelConfig, child: &ChannelOverride, include_mappings: bool) -> ChannelConfig {
    let mappings = match &child.mappings {
        Some(own) => Arc::new(own.clone()),
        None if include_mappings => Arc::new(parent.mappings.as_ref().clone()),
        None => Arc::clone(&parent.mappings),
    };

    ChannelConfig {
        adapter_type: child.adapter_type.unwrap_or(parent.adapter_type),
        polling: child.polling.or(parent.polling),
        preprocessor: child
            .preprocessor
            .clone()
            .or_else(|| parent.preprocessor.clone()),
        adapter: child
            .adapter
            .clone()
            .unwrap_or_else(|| parent.adapter.clone()),
        transport: child
            .transport
            .clone()
            .unwrap_or_else(|| parent.transport.clone()),
        mappings,
    }
}

/// Scope of a configuration node within the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigScope {
    Global,
    BusinessStream(String),
    LegalEntity(String),
    BillingAccount(String),
}

/// One node of the configuration tree, carrying independent overrides for
/// the invoice and field-ticket channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfigNode {
    #[serde(default = "defaults::scope")]
    pub scope: ConfigScope,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub invoice: Option<ChannelOverride>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_ticket: Option<ChannelOverride>,
}

impl Default for ConfigScope {
    fn default() -> Self {
        Self::Global
    }
}

/// The fully resolved configuration for one (platform, customer) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDelivery {
    pub invoice: ChannelConfig,

    /// Absent when the customer has no field-ticket delivery configured.
    pub field_ticket: Option<ChannelConfig>,
}

impl ResolvedDelivery {
    #[must_use]
    pub const fn supports_field_tickets(&self) -> bool {
        self.field_ticket.is_some()
    }

    /// The channel handling submissions of the given kind, if configured.
    #[must_use]
    pub const fn channel(&self, kind: crate::submission::TicketKind) -> Option<&ChannelConfig> {
        match kind {
            crate::submission::TicketKind::Invoice => Some(&self.invoice),
            crate::submission::TicketKind::FieldTicket => self.field_ticket.as_ref(),
        }
    }
}

mod defaults {
    use super::{ConfigScope, MappingPlacement};

    pub const fn max_attachment_size_mb() -> u64 {
        10
    }

    pub fn verb() -> String {
        "POST".to_string()
    }

    pub const fn placement() -> MappingPlacement {
        MappingPlacement::Line
    }

    pub const fn scope() -> ConfigScope {
        ConfigScope::Global
    }
}
