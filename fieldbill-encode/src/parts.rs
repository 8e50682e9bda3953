//! The transient outbound payload produced by an encode operation.

/// One unit of an outbound payload: the body or a single attachment.
///
/// The part owns its bytes outright; dropping an [`EncodedInvoice`] releases
/// every buffer exactly once regardless of how the encode operation exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPart {
    pub content: Vec<u8>,
    pub content_type: String,
    pub is_attachment: bool,

    /// Where the part's bytes came from, for diagnostics.
    pub source: String,

    /// Preferred filename when the transport sends the part as a file.
    pub file_name: Option<String>,
}

impl EncodedPart {
    /// A non-attachment body part.
    #[must_use]
    pub fn body(content: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            content,
            content_type: content_type.into(),
            is_attachment: false,
            source: "body".to_string(),
            file_name: None,
        }
    }
}

/// An ordered list of encoded parts, owned by one encode operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedInvoice {
    pub parts: Vec<EncodedPart>,
}

impl EncodedInvoice {
    #[must_use]
    pub fn new(parts: Vec<EncodedPart>) -> Self {
        Self { parts }
    }

    /// The body part, when the encoder produced one.
    #[must_use]
    pub fn body(&self) -> Option<&EncodedPart> {
        self.parts.iter().find(|p| !p.is_attachment)
    }

    /// All attachment parts, in submission order.
    pub fn attachments(&self) -> impl Iterator<Item = &EncodedPart> {
        self.parts.iter().filter(|p| p.is_attachment)
    }

    /// Total payload size in bytes across all parts.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.parts.iter().map(|p| p.content.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_and_attachment_views() {
        let invoice = EncodedInvoice::new(vec![
            EncodedPart::body(b"line".to_vec(), "text/csv"),
            EncodedPart {
                content: vec![0; 16],
                content_type: "application/pdf".to_string(),
                is_attachment: true,
                source: "tickets/t-1.pdf".to_string(),
                file_name: Some("t-1.pdf".to_string()),
            },
        ]);

        assert_eq!(invoice.body().map(|p| p.content_type.as_str()), Some("text/csv"));
        assert_eq!(invoice.attachments().count(), 1);
        assert_eq!(invoice.total_bytes(), 20);
    }
}
