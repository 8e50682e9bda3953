//! OData-style query string construction.

use std::fmt::Write;

/// Build the query string for a receipt lookup.
///
/// Produces `$select`, `$top` and a `$filter` constraining the receipt
/// number to the given set. Single quotes in receipt numbers are doubled,
/// the OData escape for a literal quote.
#[must_use]
pub fn receipt_query(fields: &[&str], top: u32, receipt_numbers: &[String]) -> String {
    let mut query = format!("$select={}&$top={top}", fields.join(","));

    if !receipt_numbers.is_empty() {
        query.push_str("&$filter=receiptNumber in (");
        for (index, number) in receipt_numbers.iter().enumerate() {
            if index > 0 {
                query.push(',');
            }
            let _ = write!(query, "'{}'", number.replace('\'', "''"));
        }
        query.push(')');
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_select_top_and_filter() {
        let query = receipt_query(
            &["itemId", "receiptNumber", "status"],
            100,
            &["T-1001".to_string(), "T-1002".to_string()],
        );
        assert_eq!(
            query,
            "$select=itemId,receiptNumber,status&$top=100&$filter=receiptNumber in ('T-1001','T-1002')"
        );
    }

    #[test]
    fn no_numbers_means_no_filter() {
        let query = receipt_query(&["status"], 25, &[]);
        assert_eq!(query, "$select=status&$top=25");
    }

    #[test]
    fn quotes_in_receipt_numbers_are_escaped() {
        let query = receipt_query(&["status"], 1, &["O'Brien-7".to_string()]);
        assert_eq!(query, "$select=status&$top=1&$filter=receiptNumber in ('O''Brien-7')");
    }
}
