//! Error types for document image optimization.

use thiserror::Error;

/// Top-level compression error type.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The document could not be parsed or re-serialized.
    #[error("Document error: {0}")]
    Document(String),

    /// Decoding, resizing or re-encoding an embedded image failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The parsing library kept returning an empty stream for an image,
    /// even after retrying.
    #[error("Empty image stream on page {page}, image {image}")]
    EmptyImageStream { page: usize, image: usize },

    /// A page or image index outside the document's bounds.
    #[error("No such image: page {page}, image {image}")]
    NoSuchImage { page: usize, image: usize },
}
