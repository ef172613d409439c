//! Conversion entry points: plain and watermarked pipelines.
//!
//! Both variants share one tail — resize, grayscale, PGM-encode — and differ
//! only in what happens before it: the watermark variant decodes a second,
//! fixed overlay image concurrently with the main image and stamps it at the
//! bottom-right anchor before the grayscale step.
//!
//! Every stage failure short-circuits the remaining stages and surfaces as a
//! single [`PgmError`]; success always yields a complete, valid PGM buffer.

use crate::config::ConversionConfig;
use crate::error::PgmError;
use crate::output::{PgmBuffer, SourceInfo};
use crate::pipeline::{decode, input, pgm, transform};
use image::DynamicImage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert an image file or URL to a binary PGM buffer.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str`    — Local file path or HTTP/HTTPS URL to an image
/// * `target_width` — Output width in pixels; height scales to preserve
///   aspect ratio
/// * `config`       — Conversion configuration
///
/// # Errors
/// Returns `Err(PgmError)` when the input cannot be resolved, the bytes do
/// not decode, the width is zero, or the source exceeds the dimension cap.
pub async fn convert(
    input_str: impl AsRef<str>,
    target_width: u32,
    config: &ConversionConfig,
) -> Result<PgmBuffer, PgmError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    let image = resolve_and_decode(input_str, config).await?;
    let buffer = finish(&image, target_width, config)?;

    info!(
        w = buffer.width(),
        h = buffer.height(),
        total_ms = total_start.elapsed().as_millis() as u64,
        "Conversion complete"
    );
    Ok(buffer)
}

/// Convert an image to a binary PGM buffer with the watermark overlay
/// stamped at the bottom-right anchor.
///
/// The overlay asset comes from the config
/// ([`ConversionConfig::overlay_source`]), defaulting to
/// [`crate::config::DEFAULT_OVERLAY_PATH`]. Main image and overlay are
/// decoded concurrently; the overlay is mandatory, so either decode failure
/// aborts the whole call.
///
/// Output dimensions always equal the resized base dimensions — an overlay
/// larger than the base is clipped, never an error.
pub async fn convert_with_overlay(
    input_str: impl AsRef<str>,
    target_width: u32,
    config: &ConversionConfig,
) -> Result<PgmBuffer, PgmError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    let overlay_src = config.overlay_source().to_string();
    info!(
        overlay = %overlay_src,
        "Starting watermarked conversion: {}", input_str
    );

    // Fan-out/fan-in: both decodes run concurrently, first failure wins.
    let (image, overlay) = futures::try_join!(
        resolve_and_decode(input_str, config),
        decode_overlay(&overlay_src, config),
    )?;

    let resized = transform::resize_to_width(&image, target_width, config.filter)?;
    let mut base = resized.to_rgba8();
    transform::composite_overlay(&mut base, &overlay);

    let gray = transform::to_grayscale(&DynamicImage::ImageRgba8(base));
    let buffer = pgm::encode(&gray);

    info!(
        w = buffer.width(),
        h = buffer.height(),
        total_ms = total_start.elapsed().as_millis() as u64,
        "Watermarked conversion complete"
    );
    Ok(buffer)
}

/// Convert image bytes in memory to a binary PGM buffer.
///
/// Skips input resolution entirely — useful when the image arrives from a
/// database, network stream, or in-memory buffer rather than a file.
pub async fn convert_from_bytes(
    bytes: &[u8],
    target_width: u32,
    config: &ConversionConfig,
) -> Result<PgmBuffer, PgmError> {
    let image = decode::decode_bytes(bytes.to_vec(), config.max_source_pixels).await?;
    finish(&image, target_width, config)
}

/// Convert an image and write the PGM directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
/// Returns the buffer that was written.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    target_width: u32,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PgmBuffer, PgmError> {
    let buffer = convert(input_str, target_width, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PgmError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("pgm.tmp");
    tokio::fs::write(&tmp_path, buffer.as_bytes())
        .await
        .map_err(|e| PgmError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| PgmError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(buffer)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    target_width: u32,
    config: &ConversionConfig,
) -> Result<PgmBuffer, PgmError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PgmError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(input_str, target_width, config))
}

/// Report a source image's dimensions and detected format without a full
/// decode.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<SourceInfo, PgmError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    let path = resolved.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let source = path.display().to_string();
        let reader = image::ImageReader::open(&path)
            .map_err(|e| PgmError::DecodeFailed {
                src: source.clone(),
                detail: e.to_string(),
            })?
            .with_guessed_format()
            .map_err(|e| PgmError::DecodeFailed {
                src: source.clone(),
                detail: e.to_string(),
            })?;

        let format = reader
            .format()
            .map(|f| format!("{f:?}").to_lowercase());
        let (width, height) = reader.into_dimensions().map_err(|e| PgmError::DecodeFailed {
            src: source,
            detail: e.to_string(),
        })?;

        Ok(SourceInfo {
            width,
            height,
            format,
        })
    })
    .await
    .map_err(|e| PgmError::Internal(format!("Inspect task panicked: {e}")))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve an input reference and decode it, holding any downloaded temp
/// file alive until the decode has consumed the bytes.
async fn resolve_and_decode(
    input_str: &str,
    config: &ConversionConfig,
) -> Result<DynamicImage, PgmError> {
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let decode_start = Instant::now();
    let image = decode::decode_image(resolved.path(), config.max_source_pixels).await?;
    debug!(
        decode_ms = decode_start.elapsed().as_millis() as u64,
        "Decoded {}", input_str
    );
    // `resolved` drops here, releasing any temp directory.
    Ok(image)
}

/// Decode the overlay asset, folding any failure into
/// [`PgmError::OverlayDecodeFailed`] so callers can tell the mandatory
/// watermark apart from the user's own image failing.
async fn decode_overlay(
    overlay_src: &str,
    config: &ConversionConfig,
) -> Result<DynamicImage, PgmError> {
    resolve_and_decode(overlay_src, config)
        .await
        .map_err(|e| PgmError::OverlayDecodeFailed {
            path: overlay_src.to_string(),
            detail: e.to_string(),
        })
}

/// Shared pipeline tail: resize, grayscale, encode.
fn finish(
    image: &DynamicImage,
    target_width: u32,
    config: &ConversionConfig,
) -> Result<PgmBuffer, PgmError> {
    let resized = transform::resize_to_width(image, target_width, config.filter)?;
    let gray = transform::to_grayscale(&resized);
    Ok(pgm::encode(&gray))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, pixel);
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32, pixel: Rgba<u8>) -> String {
        let path = dir.join(name);
        std::fs::write(&path, png_bytes(width, height, pixel)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn convert_produces_exact_header_and_plane() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 200, 100, Rgba([128, 128, 128, 255]));

        let config = ConversionConfig::default();
        let buffer = convert(&src, 100, &config).await.unwrap();

        assert!(buffer.as_bytes().starts_with(b"P5\n100 50\n255\n"));
        assert_eq!(buffer.pixels().len(), 5000);
        assert_eq!((buffer.width(), buffer.height()), (100, 50));
    }

    #[tokio::test]
    async fn convert_unresolvable_input_returns_error() {
        let config = ConversionConfig::default();
        let result = convert("not-a-url", 100, &config).await;
        assert!(matches!(result, Err(PgmError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn convert_zero_width_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 10, 10, Rgba([0, 0, 0, 255]));

        let result = convert(&src, 0, &ConversionConfig::default()).await;
        assert!(matches!(result, Err(PgmError::InvalidWidth { width: 0 })));
    }

    #[tokio::test]
    async fn convert_from_bytes_round_trips_header() {
        let bytes = png_bytes(40, 30, Rgba([10, 200, 30, 255]));
        let buffer = convert_from_bytes(&bytes, 20, &ConversionConfig::default())
            .await
            .unwrap();

        let (w, h) = crate::pipeline::pgm::parse_header(buffer.as_bytes()).unwrap();
        assert_eq!((w, h), (20, 15));
    }

    #[tokio::test]
    async fn watermark_overlay_darkens_bottom_right() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 100, 100, Rgba([255, 255, 255, 255]));
        let logo = write_png(dir.path(), "logo.png", 10, 10, Rgba([0, 0, 0, 255]));

        let config = ConversionConfig::builder()
            .overlay_source(&logo)
            .build()
            .unwrap();
        let buffer = convert_with_overlay(&src, 100, &config).await.unwrap();

        assert_eq!((buffer.width(), buffer.height()), (100, 100));
        let pixels = buffer.pixels();
        // anchor: x = 90, y = 100 - round(10/1.5) = 93; rows 93.. carry logo
        assert_eq!(pixels[95 * 100 + 95], 0);
        assert_eq!(pixels[0], 255);
    }

    #[tokio::test]
    async fn watermark_oversized_overlay_keeps_base_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 80, 40, Rgba([200, 200, 200, 255]));
        let logo = write_png(dir.path(), "logo.png", 120, 300, Rgba([0, 0, 0, 255]));

        let config = ConversionConfig::builder()
            .overlay_source(&logo)
            .build()
            .unwrap();
        let buffer = convert_with_overlay(&src, 40, &config).await.unwrap();

        // base resized to 40x20; overlay is clipped, never resized into view
        assert!(buffer.as_bytes().starts_with(b"P5\n40 20\n255\n"));
    }

    #[tokio::test]
    async fn watermark_missing_overlay_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 10, 10, Rgba([1, 2, 3, 255]));

        let config = ConversionConfig::builder()
            .overlay_source("/nonexistent/gglogo.png")
            .build()
            .unwrap();
        let result = convert_with_overlay(&src, 10, &config).await;
        assert!(matches!(result, Err(PgmError::OverlayDecodeFailed { .. })));
    }

    #[tokio::test]
    async fn convert_to_file_writes_parseable_pgm() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 16, 8, Rgba([50, 60, 70, 255]));
        let out = dir.path().join("out.pgm");

        let buffer = convert_to_file(&src, 8, &out, &ConversionConfig::default())
            .await
            .unwrap();

        let written = std::fs::read(&out).unwrap();
        assert_eq!(written, buffer.as_bytes());
        assert_eq!(
            crate::pipeline::pgm::parse_header(&written).unwrap(),
            (8, 4)
        );
    }

    #[tokio::test]
    async fn inspect_reports_source_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 64, 48, Rgba([0, 0, 0, 255]));

        let info = inspect(&src).await.unwrap();
        assert_eq!((info.width, info.height), (64, 48));
        assert_eq!(info.format.as_deref(), Some("png"));
    }

    #[test]
    fn convert_sync_matches_async() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "src.png", 20, 10, Rgba([9, 9, 9, 255]));

        let buffer = convert_sync(&src, 10, &ConversionConfig::default()).unwrap();
        assert!(buffer.as_bytes().starts_with(b"P5\n10 5\n255\n"));
    }
}
