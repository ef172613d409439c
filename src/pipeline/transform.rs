//! Geometry and colour transforms: aspect-preserving resize, watermark
//! compositing, and grayscale conversion.
//!
//! ## The watermark anchor
//!
//! The overlay is stamped right-aligned and near the bottom edge:
//! `x = base_w - overlay_w`, `y = base_h - overlay_h / 1.5`. The 1.5 divisor
//! leaves a margin below the logo and is preserved verbatim for output
//! compatibility with existing consumers. When the overlay is larger than
//! the base in either dimension the anchor goes negative and the compositor
//! clips — stamping never fails.

use crate::config::ResizeFilter;
use crate::error::PgmError;
use image::{imageops, DynamicImage, GrayImage, RgbaImage};
use tracing::debug;

/// Resize an image to a target width, scaling height to preserve aspect
/// ratio.
///
/// New height is `round(target_width * h / w)`, clamped to at least 1 pixel
/// so extreme aspect ratios cannot collapse the image. Returns the input
/// unchanged when it is already at the target width.
pub fn resize_to_width(
    img: &DynamicImage,
    target_width: u32,
    filter: ResizeFilter,
) -> Result<DynamicImage, PgmError> {
    if target_width == 0 {
        return Err(PgmError::InvalidWidth { width: 0 });
    }

    let (orig_w, orig_h) = (img.width(), img.height());
    if orig_w == target_width {
        debug!(target_width, "Image already at target width, skipping resize");
        return Ok(img.clone());
    }

    let ratio = f64::from(target_width) / f64::from(orig_w);
    let new_height = ((f64::from(orig_h) * ratio).round() as u32).max(1);

    debug!(
        orig_w,
        orig_h,
        new_width = target_width,
        new_height,
        "Resizing image to target width"
    );

    Ok(img.resize_exact(target_width, new_height, filter.to_image_filter()))
}

/// Compute the watermark anchor for an overlay on a base of the given
/// dimensions.
///
/// Either coordinate may be negative when the overlay exceeds the base in
/// that dimension; callers pass the raw values to the compositor, which
/// clips out-of-bounds pixels.
pub fn overlay_anchor(base_w: u32, base_h: u32, overlay_w: u32, overlay_h: u32) -> (i64, i64) {
    let x = i64::from(base_w) - i64::from(overlay_w);
    let y = i64::from(base_h) - (f64::from(overlay_h) / 1.5).round() as i64;
    (x, y)
}

/// Alpha-composite the overlay onto the base at the computed anchor.
///
/// The base keeps its own dimensions regardless of overlay size; overlay
/// pixels falling outside the base are discarded.
pub fn composite_overlay(base: &mut RgbaImage, overlay: &DynamicImage) {
    let (x, y) = overlay_anchor(base.width(), base.height(), overlay.width(), overlay.height());
    debug!(
        x,
        y,
        overlay_w = overlay.width(),
        overlay_h = overlay.height(),
        "Compositing overlay"
    );
    imageops::overlay(base, &overlay.to_rgba8(), x, y);
}

/// Convert an image to a single-channel luminance plane.
///
/// Uses the standard luminance weights of the `image` crate. Idempotent:
/// grayscaling an already-gray image is the identity.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    fn test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([90, 120, 200, 255]),
        ))
    }

    #[test]
    fn resize_downscale_rounds_height() {
        let img = test_image(200, 100);
        let out = resize_to_width(&img, 100, ResizeFilter::Lanczos3).unwrap();
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn resize_upscale() {
        let img = test_image(200, 100);
        let out = resize_to_width(&img, 400, ResizeFilter::Triangle).unwrap();
        assert_eq!((out.width(), out.height()), (400, 200));
    }

    #[test]
    fn resize_rounds_to_nearest() {
        // 100 * 99 / 200 = 49.5 → rounds to 50
        let img = test_image(200, 99);
        let out = resize_to_width(&img, 100, ResizeFilter::Nearest).unwrap();
        assert_eq!(out.height(), 50);
    }

    #[test]
    fn resize_same_width_is_noop() {
        let img = test_image(384, 500);
        let out = resize_to_width(&img, 384, ResizeFilter::Lanczos3).unwrap();
        assert_eq!((out.width(), out.height()), (384, 500));
    }

    #[test]
    fn resize_height_never_collapses_to_zero() {
        let img = test_image(1000, 1);
        let out = resize_to_width(&img, 10, ResizeFilter::Nearest).unwrap();
        assert_eq!(out.width(), 10);
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn resize_zero_width_rejected() {
        let img = test_image(10, 10);
        let result = resize_to_width(&img, 0, ResizeFilter::Lanczos3);
        assert!(matches!(result, Err(PgmError::InvalidWidth { width: 0 })));
    }

    #[test]
    fn anchor_right_aligned_near_bottom() {
        // base 100x50, overlay 20x30: x = 80, y = 50 - round(30/1.5) = 30
        assert_eq!(overlay_anchor(100, 50, 20, 30), (80, 30));
    }

    #[test]
    fn anchor_goes_negative_for_oversized_overlay() {
        let (x, y) = overlay_anchor(40, 20, 60, 90);
        assert_eq!(x, -20);
        assert_eq!(y, 20 - 60);
    }

    #[test]
    fn composite_oversized_overlay_keeps_base_dimensions() {
        let mut base = RgbaImage::from_pixel(30, 20, Rgba([255, 255, 255, 255]));
        let overlay = test_image(60, 90);
        composite_overlay(&mut base, &overlay);
        assert_eq!((base.width(), base.height()), (30, 20));
    }

    #[test]
    fn composite_stamps_opaque_pixels() {
        let mut base = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let overlay =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 3, Rgba([0, 0, 0, 255])));
        // anchor: x = 8, y = 10 - round(3/1.5) = 8
        composite_overlay(&mut base, &overlay);
        assert_eq!(base.get_pixel(8, 8), &Rgba([0, 0, 0, 255]));
        assert_eq!(base.get_pixel(9, 9), &Rgba([0, 0, 0, 255]));
        assert_eq!(base.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn composite_ignores_transparent_pixels() {
        let mut base = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let overlay = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        composite_overlay(&mut base, &overlay);
        assert_eq!(base.get_pixel(9, 9), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn grayscale_is_idempotent() {
        let img = test_image(8, 8);
        let once = to_grayscale(&img);
        let twice = to_grayscale(&DynamicImage::ImageLuma8(once.clone()));
        assert_eq!(once.as_raw(), twice.as_raw());
    }

    #[test]
    fn grayscale_of_gray_input_preserves_values() {
        let gray = GrayImage::from_pixel(4, 4, Luma([173]));
        let out = to_grayscale(&DynamicImage::ImageLuma8(gray));
        assert!(out.pixels().all(|p| p.0[0] == 173));
    }
}
