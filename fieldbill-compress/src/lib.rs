//! Attachment-level document image optimization.
//!
//! Runs before any generic document-level compression, because a single
//! oversized raster image dominates output size more than stream-level
//! compression can address. The document parser itself is an external
//! collaborator behind the [`Document`] trait; this crate decides which
//! embedded images deserve shrinking, resizes and recompresses them, and
//! keeps the original bytes whenever recompression does not help.

pub mod compressor;
pub mod document;
pub mod error;
pub mod strategy;
pub mod testing;

pub use compressor::{CompressionConfig, DocumentCompressor};
pub use document::{ColorMode, Document, DocumentCodec, EmbeddedImage, RasterFormat, RenderSize};
pub use error::CompressError;
pub use strategy::{CompressionStrategy, DefaultRasterStrategy, IndexedImageStrategy, PageContext};
