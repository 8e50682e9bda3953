use fieldbill_common::ReceiptStatus;
use serde::Deserialize;

/// One delivery receipt as the gateway reports it.
///
/// The receipt number is the ticket number the submission was delivered
/// under; a single number may carry several receipts when a ticket was
/// resubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Receipt {
    pub item_id: String,
    pub receipt_number: String,
    pub status: String,
}

impl Receipt {
    /// The receipt's status, parsed leniently. Statuses the gateway adds
    /// later land in [`ReceiptStatus::Unknown`] rather than failing the
    /// whole query.
    #[must_use]
    pub fn receipt_status(&self) -> ReceiptStatus {
        ReceiptStatus::from(self.status.as_str())
    }
}

/// The envelope the gateway wraps query results in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReceiptsResponse {
    #[serde(rename = "Receipts", default)]
    pub receipts: Vec<Receipt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_the_gateway_envelope() {
        let body = r#"{
            "Receipts": [
                {"ItemId": "i-1", "ReceiptNumber": "T-1001", "Status": "Approved"},
                {"ItemId": "i-2", "ReceiptNumber": "T-1002", "Status": "disputed"}
            ]
        }"#;
        let response: ReceiptsResponse = serde_json::from_str(body).expect("deserialize");
        assert_eq!(response.receipts.len(), 2);
        assert_eq!(response.receipts[0].receipt_status(), ReceiptStatus::Approved);
        assert_eq!(response.receipts[1].receipt_status(), ReceiptStatus::Disputed);
    }

    #[test]
    fn missing_receipts_key_means_empty() {
        let response: ReceiptsResponse = serde_json::from_str("{}").expect("deserialize");
        assert!(response.receipts.is_empty());
    }

    #[test]
    fn unrecognized_statuses_are_preserved() {
        let receipt = Receipt {
            item_id: "i-1".to_string(),
            receipt_number: "T-1001".to_string(),
            status: "Quarantined".to_string(),
        };
        assert_eq!(
            receipt.receipt_status(),
            ReceiptStatus::Unknown("Quarantined".to_string())
        );
    }
}
