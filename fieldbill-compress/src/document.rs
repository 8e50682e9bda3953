//! The seam between this crate and the external document parser.
//!
//! PDF parsing and rendering are out of scope here; the parser exposes a
//! document through [`Document`], and whatever bytes it hands back for an
//! embedded image are what get optimized.

use crate::error::CompressError;

/// A width/height pair in rendered page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSize {
    pub width: f32,
    pub height: f32,
}

impl RenderSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A footprint too small to be a meaningful resize target.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }
}

/// Color model of an embedded image, as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Paletted/indexed color.
    Indexed,
    Rgb,
    Grayscale,
}

/// Encoded format of an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

/// Metadata for one embedded image on a page.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Position of the image within its page's image list.
    pub index: usize,

    /// Pixel dimensions of the stored raster.
    pub width: u32,
    pub height: u32,

    pub color: ColorMode,
    pub format: RasterFormat,

    /// Footprint the image occupies as placed on the page, when the parser
    /// can report it.
    pub rendered: Option<RenderSize>,
}

/// Access to a parsed document.
///
/// `image_bytes` may transiently return an empty buffer; callers are
/// expected to retry. Everything else is assumed stable for the lifetime of
/// the document.
pub trait Document: Send + Sync {
    fn page_count(&self) -> usize;

    /// Rendered bounds of a page.
    ///
    /// # Errors
    /// Fails when the page index is out of range.
    fn page_bounds(&self, page: usize) -> Result<RenderSize, CompressError>;

    /// Enumerate the embedded images on a page.
    ///
    /// # Errors
    /// Fails when the parser cannot walk the page's resources.
    fn images(&self, page: usize) -> Result<Vec<EmbeddedImage>, CompressError>;

    /// Raw encoded bytes of an embedded image.
    ///
    /// # Errors
    /// Fails when the image does not exist.
    fn image_bytes(&self, page: usize, image: usize) -> Result<Vec<u8>, CompressError>;

    /// Replace an embedded image's bytes with a recompressed version.
    ///
    /// # Errors
    /// Fails when the image does not exist.
    fn replace_image(&mut self, page: usize, image: usize, bytes: Vec<u8>)
    -> Result<(), CompressError>;

    /// Re-serialize the document, applying generic stream-level compression.
    ///
    /// # Errors
    /// Fails when the document cannot be written back out.
    fn save_compressed(&self) -> Result<Vec<u8>, CompressError>;
}

/// Opens documents. Implemented outside this crate by the PDF parser
/// integration; implemented in [`crate::testing`] for tests.
pub trait DocumentCodec: Send + Sync {
    /// Parse raw attachment bytes into a document.
    ///
    /// # Errors
    /// Fails when the bytes are not a parseable document.
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn Document>, CompressError>;
}
