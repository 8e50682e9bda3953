//! Per-image compression decisions.
//!
//! Strategies form an ordered list and the first applicable one wins. Each
//! strategy answers three questions about an image: does it apply at all,
//! should this particular image be skipped, and what size should the resized
//! raster be.

use crate::document::{ColorMode, EmbeddedImage, RasterFormat, RenderSize};

/// Page-level facts a strategy needs to judge an image.
#[derive(Debug, Clone, Copy)]
pub struct PageContext {
    pub page: usize,
    pub bounds: RenderSize,
    /// Number of embedded images on the page.
    pub image_count: usize,
}

/// One entry in the ordered strategy list.
pub trait CompressionStrategy: Send + Sync {
    /// Whether this strategy handles images of this kind at all.
    fn applies_to(&self, image: &EmbeddedImage) -> bool;

    /// Whether an otherwise-applicable image should be left untouched.
    fn should_skip(&self, page: &PageContext, image: &EmbeddedImage) -> bool;

    /// Target pixel dimensions for the resized raster, each at least 1.
    fn target_size(&self, page: &PageContext, image: &EmbeddedImage) -> (u32, u32);
}

/// Shared target computation: match the page-rendered footprint when it is
/// non-trivial, otherwise shrink by the strategy's reduction factor.
#[allow(clippy::cast_precision_loss, reason = "image dimensions fit in f32")]
fn reduced_target(image: &EmbeddedImage, reduction_factor: f32) -> (u32, u32) {
    if let Some(rendered) = image.rendered
        && !rendered.is_trivial()
    {
        return clamp(rendered.width, rendered.height);
    }

    clamp(
        image.width as f32 * reduction_factor,
        image.height as f32 * reduction_factor,
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "targets are clamped to at least one pixel"
)]
fn clamp(width: f32, height: f32) -> (u32, u32) {
    ((width as u32).max(1), (height as u32).max(1))
}

/// Whether the stored raster is larger than the page it is placed on.
#[allow(clippy::cast_precision_loss, reason = "image dimensions fit in f32")]
fn exceeds_page_bounds(page: &PageContext, image: &EmbeddedImage) -> bool {
    image.width as f32 > page.bounds.width || image.height as f32 > page.bounds.height
}

/// Strategy for indexed-color images in palette-friendly formats.
///
/// Recompressing a palette image usually costs more than it saves, so this
/// strategy only acts on the clear win: a page holding exactly one image
/// that is larger than the page's rendered bounds.
#[derive(Debug, Clone, Copy)]
pub struct IndexedImageStrategy {
    reduction_factor: f32,
}

impl IndexedImageStrategy {
    #[must_use]
    pub const fn new(reduction_factor: f32) -> Self {
        Self { reduction_factor }
    }
}

impl CompressionStrategy for IndexedImageStrategy {
    fn applies_to(&self, image: &EmbeddedImage) -> bool {
        image.color == ColorMode::Indexed && image.format == RasterFormat::Png
    }

    fn should_skip(&self, page: &PageContext, image: &EmbeddedImage) -> bool {
        !(page.image_count == 1 && exceeds_page_bounds(page, image))
    }

    fn target_size(&self, _page: &PageContext, image: &EmbeddedImage) -> (u32, u32) {
        reduced_target(image, self.reduction_factor)
    }
}

/// Fallback strategy for common raster formats. Never skips.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRasterStrategy {
    reduction_factor: f32,
}

impl DefaultRasterStrategy {
    #[must_use]
    pub const fn new(reduction_factor: f32) -> Self {
        Self { reduction_factor }
    }
}

impl CompressionStrategy for DefaultRasterStrategy {
    fn applies_to(&self, image: &EmbeddedImage) -> bool {
        matches!(image.format, RasterFormat::Png | RasterFormat::Jpeg)
    }

    fn should_skip(&self, _page: &PageContext, _image: &EmbeddedImage) -> bool {
        false
    }

    fn target_size(&self, _page: &PageContext, image: &EmbeddedImage) -> (u32, u32) {
        reduced_target(image, self.reduction_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32, color: ColorMode, format: RasterFormat) -> EmbeddedImage {
        EmbeddedImage {
            index: 0,
            width,
            height,
            color,
            format,
            rendered: None,
        }
    }

    fn page(width: f32, height: f32, image_count: usize) -> PageContext {
        PageContext {
            page: 0,
            bounds: RenderSize::new(width, height),
            image_count,
        }
    }

    #[test]
    fn indexed_strategy_applicability() {
        let strategy = IndexedImageStrategy::new(0.5);
        assert!(strategy.applies_to(&image(100, 100, ColorMode::Indexed, RasterFormat::Png)));
        assert!(!strategy.applies_to(&image(100, 100, ColorMode::Rgb, RasterFormat::Png)));
        assert!(!strategy.applies_to(&image(100, 100, ColorMode::Indexed, RasterFormat::Jpeg)));
    }

    #[test]
    fn indexed_strategy_skips_unless_lone_oversized_image() {
        let strategy = IndexedImageStrategy::new(0.5);
        let oversized = image(2000, 2000, ColorMode::Indexed, RasterFormat::Png);
        let small = image(100, 100, ColorMode::Indexed, RasterFormat::Png);

        // Lone image larger than the page: compress
        assert!(!strategy.should_skip(&page(612.0, 792.0, 1), &oversized));
        // Lone image that fits: skip
        assert!(strategy.should_skip(&page(612.0, 792.0, 1), &small));
        // Oversized but sharing the page: skip
        assert!(strategy.should_skip(&page(612.0, 792.0, 2), &oversized));
    }

    #[test]
    fn default_strategy_never_skips() {
        let strategy = DefaultRasterStrategy::new(0.75);
        let img = image(10, 10, ColorMode::Rgb, RasterFormat::Jpeg);
        assert!(strategy.applies_to(&img));
        assert!(!strategy.should_skip(&page(612.0, 792.0, 5), &img));
    }

    #[test]
    fn target_matches_rendered_footprint_when_non_trivial() {
        let strategy = DefaultRasterStrategy::new(0.75);
        let mut img = image(2000, 1000, ColorMode::Rgb, RasterFormat::Png);
        img.rendered = Some(RenderSize::new(400.0, 200.0));

        assert_eq!(strategy.target_size(&page(612.0, 792.0, 1), &img), (400, 200));
    }

    #[test]
    fn target_falls_back_to_reduction_factor() {
        let strategy = DefaultRasterStrategy::new(0.5);
        let img = image(2000, 1000, ColorMode::Rgb, RasterFormat::Png);
        assert_eq!(strategy.target_size(&page(612.0, 792.0, 1), &img), (1000, 500));

        // A trivial footprint is ignored
        let mut img = image(2000, 1000, ColorMode::Rgb, RasterFormat::Png);
        img.rendered = Some(RenderSize::new(0.5, 0.5));
        assert_eq!(strategy.target_size(&page(612.0, 792.0, 1), &img), (1000, 500));
    }

    #[test]
    fn target_is_clamped_to_one_pixel() {
        let strategy = DefaultRasterStrategy::new(0.1);
        let img = image(3, 3, ColorMode::Rgb, RasterFormat::Png);
        assert_eq!(strategy.target_size(&page(612.0, 792.0, 1), &img), (1, 1));
    }
}
