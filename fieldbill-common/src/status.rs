//! Receipt statuses reported by remote billing gateways, and the canonical
//! outward statuses forwarded to original senders.

use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Status of a receipt as reported by the remote gateway.
///
/// The wire representation is a free-form string; anything outside the known
/// set is preserved in `Unknown` rather than rejected, because gateways add
/// statuses without notice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReceiptStatus {
    Approved,
    Disputed,
    Cancelled,
    Submitted,
    Saved,
    Unknown(String),
}

impl ReceiptStatus {
    /// Checks whether no further state transition is expected for this status.
    ///
    /// Only final statuses end reconciliation for a delivery request.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Approved | Self::Disputed | Self::Cancelled)
    }
}

impl From<&str> for ReceiptStatus {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "approved" => Self::Approved,
            "disputed" => Self::Disputed,
            "cancelled" => Self::Cancelled,
            "submitted" => Self::Submitted,
            "saved" => Self::Saved,
            _ => Self::Unknown(value.to_string()),
        }
    }
}

impl Display for ReceiptStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::Approved => write!(fmt, "Approved"),
            Self::Disputed => write!(fmt, "Disputed"),
            Self::Cancelled => write!(fmt, "Cancelled"),
            Self::Submitted => write!(fmt, "Submitted"),
            Self::Saved => write!(fmt, "Saved"),
            Self::Unknown(s) => write!(fmt, "{s}"),
        }
    }
}

/// Canonical status forwarded to the original sender after reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutwardStatus {
    Approved,
    Denied,
    Other,
    #[default]
    None,
}

/// Translation from remote to canonical status. Total and deterministic:
/// Approved maps to Approved, Disputed and Cancelled to Denied, Submitted and
/// Saved to Other, and anything unmapped to None.
impl From<&ReceiptStatus> for OutwardStatus {
    fn from(status: &ReceiptStatus) -> Self {
        match status {
            ReceiptStatus::Approved => Self::Approved,
            ReceiptStatus::Disputed | ReceiptStatus::Cancelled => Self::Denied,
            ReceiptStatus::Submitted | ReceiptStatus::Saved => Self::Other,
            ReceiptStatus::Unknown(_) => Self::None,
        }
    }
}
