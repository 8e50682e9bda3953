//! The document compressor: walks a document's pages and images, applies the
//! first applicable strategy to each image, and falls back to the original
//! bytes whenever recompression does not shrink them.

use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    document::{Document, DocumentCodec, EmbeddedImage, RasterFormat},
    error::CompressError,
    strategy::{CompressionStrategy, DefaultRasterStrategy, IndexedImageStrategy, PageContext},
};

/// Tuning for the per-image optimization pass.
#[derive(Debug, Clone, Deserialize)]
pub struct CompressionConfig {
    /// Reduction factor for indexed-color images without a usable rendered
    /// footprint.
    #[serde(default = "defaults::indexed_reduction_factor")]
    pub indexed_reduction_factor: f32,

    /// Reduction factor for all other raster images without a usable
    /// rendered footprint.
    #[serde(default = "defaults::default_reduction_factor")]
    pub default_reduction_factor: f32,

    /// How many times to ask the parser for an image stream before giving
    /// up on a transient empty result.
    #[serde(default = "defaults::stream_fetch_attempts")]
    pub stream_fetch_attempts: u32,

    /// Base delay between stream fetch attempts; attempt `n` waits
    /// `n * base` (linear backoff).
    #[serde(default = "defaults::stream_fetch_backoff_ms")]
    pub stream_fetch_backoff_ms: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            indexed_reduction_factor: defaults::indexed_reduction_factor(),
            default_reduction_factor: defaults::default_reduction_factor(),
            stream_fetch_attempts: defaults::stream_fetch_attempts(),
            stream_fetch_backoff_ms: defaults::stream_fetch_backoff_ms(),
        }
    }
}

mod defaults {
    pub const fn indexed_reduction_factor() -> f32 {
        0.5
    }

    pub const fn default_reduction_factor() -> f32 {
        0.75
    }

    pub const fn stream_fetch_attempts() -> u32 {
        3
    }

    pub const fn stream_fetch_backoff_ms() -> u64 {
        50
    }
}

/// Optimizes the embedded images of a document before generic document-level
/// compression.
///
/// The strategy list is ordered: the indexed-palette strategy is consulted
/// first, the default raster strategy second, and the first applicable one
/// wins for a given image.
pub struct DocumentCompressor {
    codec: Arc<dyn DocumentCodec>,
    strategies: Vec<Box<dyn CompressionStrategy>>,
    config: CompressionConfig,
}

impl DocumentCompressor {
    #[must_use]
    pub fn new(codec: Arc<dyn DocumentCodec>, config: CompressionConfig) -> Self {
        let strategies: Vec<Box<dyn CompressionStrategy>> = vec![
            Box::new(IndexedImageStrategy::new(config.indexed_reduction_factor)),
            Box::new(DefaultRasterStrategy::new(config.default_reduction_factor)),
        ];

        Self {
            codec,
            strategies,
            config,
        }
    }

    /// Optimize a document's images and re-serialize it with stream-level
    /// compression applied.
    ///
    /// Per-image failures are logged and do not abort sibling images. A
    /// failure enumerating a page's images aborts only the image phase;
    /// document-level compression still runs.
    ///
    /// # Errors
    /// Fails when the document cannot be parsed or written back out.
    pub async fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, CompressError> {
        let mut document = self.codec.open(bytes)?;
        self.optimize_images(document.as_mut()).await;
        document.save_compressed()
    }

    async fn optimize_images(&self, document: &mut dyn Document) {
        for page in 0..document.page_count() {
            let (images, bounds) = match (document.images(page), document.page_bounds(page)) {
                (Ok(images), Ok(bounds)) => (images, bounds),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(
                        page = page,
                        error = %e,
                        "Failed to enumerate page images, aborting image phase"
                    );
                    return;
                }
            };

            let context = PageContext {
                page,
                bounds,
                image_count: images.len(),
            };

            for image in &images {
                if let Err(e) = self.optimize_image(document, &context, image).await {
                    warn!(
                        page = context.page,
                        image = image.index,
                        error = %e,
                        "Image compression failed, keeping original bytes"
                    );
                }
            }
        }
    }

    async fn optimize_image(
        &self,
        document: &mut dyn Document,
        page: &PageContext,
        image: &EmbeddedImage,
    ) -> Result<(), CompressError> {
        let Some(strategy) = self.strategies.iter().find(|s| s.applies_to(image)) else {
            return Ok(());
        };

        if strategy.should_skip(page, image) {
            debug!(
                page = page.page,
                image = image.index,
                "Strategy declined to compress image"
            );
            return Ok(());
        }

        let original = self
            .fetch_image_bytes(&*document, page.page, image.index)
            .await?;
        let (width, height) = strategy.target_size(page, image);
        let recompressed = recompress(&original, width, height, image.format)?;

        if recompressed.len() < original.len() {
            debug!(
                page = page.page,
                image = image.index,
                original_bytes = original.len(),
                compressed_bytes = recompressed.len(),
                "Replacing image with recompressed version"
            );
            document.replace_image(page.page, image.index, recompressed)?;
        } else {
            debug!(
                page = page.page,
                image = image.index,
                "Recompressed image is not smaller, keeping original bytes"
            );
        }

        Ok(())
    }

    /// Fetch an image stream, absorbing transient empty results from the
    /// parsing library with a bounded linear backoff.
    async fn fetch_image_bytes(
        &self,
        document: &dyn Document,
        page: usize,
        image: usize,
    ) -> Result<Vec<u8>, CompressError> {
        let mut attempt = 1;
        loop {
            let bytes = document.image_bytes(page, image)?;
            if !bytes.is_empty() {
                return Ok(bytes);
            }

            if attempt >= self.config.stream_fetch_attempts {
                return Err(CompressError::EmptyImageStream { page, image });
            }

            debug!(
                page = page,
                image = image,
                attempt = attempt,
                "Parser returned an empty image stream, retrying"
            );
            tokio::time::sleep(Duration::from_millis(
                self.config.stream_fetch_backoff_ms * u64::from(attempt),
            ))
            .await;
            attempt += 1;
        }
    }
}

/// Resize and re-encode an image in its original format.
fn recompress(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: RasterFormat,
) -> Result<Vec<u8>, CompressError> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = decoded.resize_exact(width, height, image::imageops::FilterType::Triangle);

    let target = match format {
        RasterFormat::Png => image::ImageFormat::Png,
        RasterFormat::Jpeg => image::ImageFormat::Jpeg,
    };

    let mut out = std::io::Cursor::new(Vec::new());
    resized.write_to(&mut out, target)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        document::{ColorMode, RenderSize},
        testing::{InMemoryCodec, PageSpec, StoredImage},
    };

    /// A busy gradient PNG that actually shrinks when resized down.
    fn noisy_png(width: u32, height: u32) -> Vec<u8> {
        #[allow(clippy::cast_possible_truncation, reason = "test pattern")]
        let raster = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
        });
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(raster)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode test image");
        out.into_inner()
    }

    fn compressor(codec: InMemoryCodec) -> DocumentCompressor {
        let config = CompressionConfig {
            stream_fetch_backoff_ms: 1,
            ..Default::default()
        };
        DocumentCompressor::new(std::sync::Arc::new(codec), config)
    }

    #[tokio::test]
    async fn oversized_raster_is_shrunk() {
        let original = noisy_png(400, 400);
        let original_len = original.len();
        let codec = InMemoryCodec::single_page(PageSpec::new(RenderSize::new(612.0, 792.0)).with_image(
            StoredImage::new(400, 400, ColorMode::Rgb, RasterFormat::Png, original)
                .rendered(RenderSize::new(100.0, 100.0)),
        ));

        let output = compressor(codec)
            .compress(b"document")
            .await
            .expect("compress");
        assert!(
            output.len() < original_len,
            "expected {} < {original_len}",
            output.len()
        );
    }

    #[tokio::test]
    async fn recompression_that_grows_keeps_original() {
        // A tiny original with a large rendered footprint: the resized
        // version is bigger, so the original bytes must survive.
        let original = noisy_png(4, 4);
        let original_len = original.len();
        let codec = InMemoryCodec::single_page(PageSpec::new(RenderSize::new(612.0, 792.0)).with_image(
            StoredImage::new(4, 4, ColorMode::Rgb, RasterFormat::Png, original)
                .rendered(RenderSize::new(500.0, 500.0)),
        ));

        let output = compressor(codec)
            .compress(b"document")
            .await
            .expect("compress");
        assert_eq!(output.len(), original_len);
    }

    #[tokio::test]
    async fn transient_empty_streams_are_retried() {
        let original = noisy_png(400, 400);
        let original_len = original.len();
        let codec = InMemoryCodec::single_page(PageSpec::new(RenderSize::new(612.0, 792.0)).with_image(
            StoredImage::new(400, 400, ColorMode::Rgb, RasterFormat::Png, original)
                .rendered(RenderSize::new(100.0, 100.0))
                .empty_fetches(2),
        ));

        let output = compressor(codec)
            .compress(b"document")
            .await
            .expect("compress");
        assert!(output.len() < original_len);
    }

    #[tokio::test]
    async fn exhausted_stream_retries_keep_original() {
        let original = noisy_png(400, 400);
        let original_len = original.len();
        let codec = InMemoryCodec::single_page(PageSpec::new(RenderSize::new(612.0, 792.0)).with_image(
            StoredImage::new(400, 400, ColorMode::Rgb, RasterFormat::Png, original)
                .rendered(RenderSize::new(100.0, 100.0))
                .empty_fetches(10),
        ));

        // The per-image failure is isolated; the document still serializes.
        let output = compressor(codec)
            .compress(b"document")
            .await
            .expect("compress");
        assert_eq!(output.len(), original_len);
    }

    #[tokio::test]
    async fn failing_image_does_not_abort_siblings() {
        let corrupt = vec![0u8; 64];
        let good = noisy_png(400, 400);
        let good_len = good.len();
        let page = PageSpec::new(RenderSize::new(612.0, 792.0))
            .with_image(StoredImage::new(
                400,
                400,
                ColorMode::Rgb,
                RasterFormat::Png,
                corrupt,
            ))
            .with_image(
                StoredImage::new(400, 400, ColorMode::Rgb, RasterFormat::Png, good)
                    .rendered(RenderSize::new(100.0, 100.0)),
            );
        let codec = InMemoryCodec::single_page(page);

        let output = compressor(codec)
            .compress(b"document")
            .await
            .expect("compress");
        // 64 corrupt bytes untouched, sibling shrunk
        assert!(output.len() < 64 + good_len);
    }

    #[tokio::test]
    async fn enumeration_failure_skips_image_phase_only() {
        let original = noisy_png(400, 400);
        let original_len = original.len();
        let page = PageSpec::new(RenderSize::new(612.0, 792.0)).with_image(
            StoredImage::new(400, 400, ColorMode::Rgb, RasterFormat::Png, original)
                .rendered(RenderSize::new(100.0, 100.0)),
        );
        let codec = InMemoryCodec::single_page(page).fail_enumeration_on(0);

        // Document-level serialization still runs, images untouched
        let output = compressor(codec)
            .compress(b"document")
            .await
            .expect("compress");
        assert_eq!(output.len(), original_len);
    }

    #[tokio::test]
    async fn indexed_image_sharing_a_page_is_skipped() {
        let indexed = noisy_png(2000, 2000);
        let indexed_len = indexed.len();
        let jpeg_free = vec![1u8; 32];
        let page = PageSpec::new(RenderSize::new(612.0, 792.0))
            .with_image(StoredImage::new(
                2000,
                2000,
                ColorMode::Indexed,
                RasterFormat::Png,
                indexed,
            ))
            .with_image(StoredImage::new(
                10,
                10,
                ColorMode::Grayscale,
                RasterFormat::Jpeg,
                jpeg_free,
            ));
        let codec = InMemoryCodec::single_page(page);

        // The indexed strategy is the first applicable one and it declines
        // to compress an image that shares its page, so the image is left
        // untouched. The corrupt sibling fails in isolation.
        let output = compressor(codec)
            .compress(b"document")
            .await
            .expect("compress");
        assert_eq!(output.len(), indexed_len + 32);
    }

    #[tokio::test]
    async fn compression_can_run_on_a_spawned_task() {
        // The compressor is shared across worker tasks in the pipeline, so
        // its future has to be spawnable.
        let original = noisy_png(64, 64);
        let codec = InMemoryCodec::single_page(PageSpec::new(RenderSize::new(612.0, 792.0)).with_image(
            StoredImage::new(64, 64, ColorMode::Rgb, RasterFormat::Png, original),
        ));
        let compressor = std::sync::Arc::new(compressor(codec));

        let task = tokio::spawn(async move { compressor.compress(b"document").await });
        task.await.expect("join").expect("compress");
    }
}
