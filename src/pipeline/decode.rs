//! Image decoding: resolved path or raw bytes → `DynamicImage`.
//!
//! ## Why spawn_blocking?
//!
//! Decoding a large JPEG or PNG is CPU-bound and can take tens of
//! milliseconds. Running it under `tokio::task::spawn_blocking` keeps the
//! Tokio worker threads free while the decode proceeds on the blocking pool,
//! the same discipline the rest of the async pipeline relies on.
//!
//! ## Why cap dimensions?
//!
//! A tiny compressed file can declare an enormous pixel grid (a
//! decompression bomb). `max_px` bounds either decoded dimension before the
//! image is handed to the transform stage, keeping memory proportional to
//! the cap rather than to attacker-controlled headers.

use crate::error::PgmError;
use image::{DynamicImage, ImageReader};
use std::path::Path;
use tracing::debug;

/// Decode the image at `path`, guessing the format from content.
///
/// Runs on the blocking pool. The reported `source` in a
/// [`PgmError::DecodeFailed`] is the path as given, so error messages point
/// the user at the right file.
pub async fn decode_image(path: &Path, max_px: u32) -> Result<DynamicImage, PgmError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let source = path.display().to_string();
        let img = ImageReader::open(&path)
            .map_err(|e| PgmError::DecodeFailed {
                src: source.clone(),
                detail: e.to_string(),
            })?
            .with_guessed_format()
            .map_err(|e| PgmError::DecodeFailed {
                src: source.clone(),
                detail: e.to_string(),
            })?
            .decode()
            .map_err(|e| PgmError::DecodeFailed {
                src: source.clone(),
                detail: e.to_string(),
            })?;
        check_dimensions(&img, max_px)?;
        debug!(source, w = img.width(), h = img.height(), "Decoded image");
        Ok(img)
    })
    .await
    .map_err(|e| PgmError::Internal(format!("Decode task panicked: {e}")))?
}

/// Decode an image held entirely in memory.
///
/// Used by [`crate::convert::convert_from_bytes`], which skips the input
/// resolution stage.
pub async fn decode_bytes(bytes: Vec<u8>, max_px: u32) -> Result<DynamicImage, PgmError> {
    tokio::task::spawn_blocking(move || {
        let img = image::load_from_memory(&bytes).map_err(|e| PgmError::DecodeFailed {
            src: "<memory>".into(),
            detail: e.to_string(),
        })?;
        check_dimensions(&img, max_px)?;
        debug!(w = img.width(), h = img.height(), "Decoded in-memory image");
        Ok(img)
    })
    .await
    .map_err(|e| PgmError::Internal(format!("Decode task panicked: {e}")))?
}

fn check_dimensions(img: &DynamicImage, max_px: u32) -> Result<(), PgmError> {
    let (w, h) = (img.width(), img.height());
    if w > max_px || h > max_px {
        return Err(PgmError::SourceTooLarge {
            width: w,
            height: h,
            max: max_px,
        });
    }
    Ok(())
}
