//! In-memory document codec for tests.
//!
//! Stands in for the external PDF parser so the compressor's decision logic
//! can be exercised without real documents. `save_compressed` concatenates
//! the image payloads, which makes output sizes directly assertable.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::{
    document::{ColorMode, Document, DocumentCodec, EmbeddedImage, RasterFormat, RenderSize},
    error::CompressError,
};

/// One embedded image with configurable fetch behavior.
#[derive(Debug)]
pub struct StoredImage {
    width: u32,
    height: u32,
    color: ColorMode,
    format: RasterFormat,
    rendered: Option<RenderSize>,
    bytes: Vec<u8>,
    /// Number of initial fetches that return an empty stream, simulating
    /// the parsing library's transient failures.
    empty_fetches: AtomicU32,
}

impl StoredImage {
    #[must_use]
    pub fn new(
        width: u32,
        height: u32,
        color: ColorMode,
        format: RasterFormat,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            color,
            format,
            rendered: None,
            bytes,
            empty_fetches: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub const fn rendered(mut self, rendered: RenderSize) -> Self {
        self.rendered = Some(rendered);
        self
    }

    #[must_use]
    pub fn empty_fetches(self, count: u32) -> Self {
        self.empty_fetches.store(count, Ordering::SeqCst);
        self
    }
}

/// One page of an in-memory document.
#[derive(Debug, Default)]
pub struct PageSpec {
    bounds: Option<RenderSize>,
    images: Vec<StoredImage>,
}

impl PageSpec {
    #[must_use]
    pub fn new(bounds: RenderSize) -> Self {
        Self {
            bounds: Some(bounds),
            images: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: StoredImage) -> Self {
        self.images.push(image);
        self
    }
}

/// In-memory [`Document`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    pages: Vec<PageSpec>,
    fail_enumeration_on: Option<usize>,
}

impl InMemoryDocument {
    #[must_use]
    pub fn new(pages: Vec<PageSpec>) -> Self {
        Self {
            pages,
            fail_enumeration_on: None,
        }
    }

    fn image(&self, page: usize, image: usize) -> Result<&StoredImage, CompressError> {
        self.pages
            .get(page)
            .and_then(|p| p.images.get(image))
            .ok_or(CompressError::NoSuchImage { page, image })
    }
}

impl Document for InMemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_bounds(&self, page: usize) -> Result<RenderSize, CompressError> {
        self.pages
            .get(page)
            .and_then(|p| p.bounds)
            .ok_or_else(|| CompressError::Document(format!("no such page: {page}")))
    }

    fn images(&self, page: usize) -> Result<Vec<EmbeddedImage>, CompressError> {
        if self.fail_enumeration_on == Some(page) {
            return Err(CompressError::Document(format!(
                "image enumeration failed on page {page}"
            )));
        }

        Ok(self
            .pages
            .get(page)
            .map(|p| {
                p.images
                    .iter()
                    .enumerate()
                    .map(|(index, stored)| EmbeddedImage {
                        index,
                        width: stored.width,
                        height: stored.height,
                        color: stored.color,
                        format: stored.format,
                        rendered: stored.rendered,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn image_bytes(&self, page: usize, image: usize) -> Result<Vec<u8>, CompressError> {
        let stored = self.image(page, image)?;

        let remaining = stored.empty_fetches.load(Ordering::SeqCst);
        if remaining > 0 {
            stored.empty_fetches.store(remaining - 1, Ordering::SeqCst);
            return Ok(Vec::new());
        }

        Ok(stored.bytes.clone())
    }

    fn replace_image(
        &mut self,
        page: usize,
        image: usize,
        bytes: Vec<u8>,
    ) -> Result<(), CompressError> {
        self.image(page, image)?;
        self.pages[page].images[image].bytes = bytes;
        Ok(())
    }

    fn save_compressed(&self) -> Result<Vec<u8>, CompressError> {
        Ok(self
            .pages
            .iter()
            .flat_map(|p| p.images.iter())
            .flat_map(|i| i.bytes.iter().copied())
            .collect())
    }
}

/// [`DocumentCodec`] that hands out one pre-built document per `open` call.
pub struct InMemoryCodec {
    documents: std::sync::Mutex<Vec<InMemoryDocument>>,
}

impl InMemoryCodec {
    /// Codec producing a single one-page document.
    #[must_use]
    pub fn single_page(page: PageSpec) -> Self {
        Self {
            documents: std::sync::Mutex::new(vec![InMemoryDocument::new(vec![page])]),
        }
    }

    /// Codec producing the given documents, one per `open` call in order.
    #[must_use]
    pub fn new(documents: Vec<InMemoryDocument>) -> Self {
        Self {
            documents: std::sync::Mutex::new(documents),
        }
    }

    /// Make image enumeration fail on the given page of every remaining
    /// document.
    #[must_use]
    pub fn fail_enumeration_on(self, page: usize) -> Self {
        {
            let mut documents = self
                .documents
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            for document in documents.iter_mut() {
                document.fail_enumeration_on = Some(page);
            }
        }
        self
    }
}

impl DocumentCodec for InMemoryCodec {
    fn open(&self, _bytes: &[u8]) -> Result<Box<dyn Document>, CompressError> {
        let mut documents = self
            .documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if documents.is_empty() {
            return Err(CompressError::Document(
                "no document available to open".to_string(),
            ));
        }
        Ok(Box::new(documents.remove(0)))
    }
}
