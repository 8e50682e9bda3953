//! Concrete encoders, one per adapter type.

mod csv;
mod templated;

pub use csv::CsvInvoiceEncoder;
pub use templated::TemplatedPayloadEncoder;

use fieldbill_common::{template, TicketSubmission};

/// Resolve a template token against a submission.
///
/// Supported token types: `field` looks up a mapped field by name, `ticket`
/// exposes the submission's identity (`number`, `customer`, `platform`), and
/// `const` echoes the token value. Unknown types resolve to `None`, leaving
/// the token verbatim in the output.
pub(crate) fn resolve_token(
    submission: &TicketSubmission,
    kind: &str,
    value: &str,
    _option: Option<&str>,
) -> Option<String> {
    match kind {
        "field" => submission.field(value),
        "ticket" => match value {
            "number" => Some(submission.ticket_number.clone()),
            "customer" => Some(submission.customer_id.clone()),
            "platform" => Some(submission.platform.clone()),
            _ => None,
        },
        "const" => Some(value.to_string()),
        _ => None,
    }
}

/// Interpolate an expression template against a submission.
pub(crate) fn interpolate_expression(submission: &TicketSubmission, expression: &str) -> String {
    template::interpolate(expression, |kind, value, option| {
        resolve_token(submission, kind, value, option)
    })
}
