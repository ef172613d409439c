//! # img2pgm
//!
//! Convert arbitrary raster images into grayscale, optionally watermarked,
//! fixed-width binary PGM (P5) buffers.
//!
//! ## Why this crate?
//!
//! Thermal/dot-matrix printer drivers and OCR front-ends want the simplest
//! possible raster: a known width, one byte per pixel, a header a firmware
//! can parse in a dozen instructions. Binary PGM is exactly that. This crate
//! takes whatever the user has — a PNG behind a URL, a JPEG from a file
//! picker — and deterministically produces that byte-exact stream.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image reference (URL / path / file selection)
//!  │
//!  ├─ 1. Input      resolve local file or download to a temp dir
//!  ├─ 2. Decode     bytes → pixel grid (CPU-bound, spawn_blocking)
//!  ├─ 3. Resize     target width, height scaled to preserve aspect ratio
//!  ├─ 4. Overlay    (watermark variant) stamp logo at bottom-right anchor
//!  ├─ 5. Grayscale  colour channels → one luminance byte per pixel
//!  └─ 6. Encode     "P5\n{w} {h}\n255\n" + row-major pixel plane
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2pgm::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let pgm = convert("https://example.com/photo.jpg", 384, &config).await?;
//!     std::fs::write("photo.pgm", pgm.as_bytes())?;
//!     Ok(())
//! }
//! ```
//!
//! The watermark variant stamps a fixed overlay asset before grayscaling:
//!
//! ```rust,no_run
//! # use img2pgm::{convert_with_overlay, ConversionConfig};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConversionConfig::builder()
//!     .overlay_source("assets/logo.png")
//!     .build()?;
//! let pgm = convert_with_overlay("photo.jpg", 384, &config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Each conversion runs as a single async task owning all of its
//! intermediate state; concurrent conversions share nothing and need no
//! locking. Failure at any stage short-circuits the rest and surfaces as one
//! [`PgmError`] — there is no partial output and no retry.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ResizeFilter, DEFAULT_OVERLAY_PATH};
pub use convert::{
    convert, convert_from_bytes, convert_sync, convert_to_file, convert_with_overlay, inspect,
};
pub use error::PgmError;
pub use output::{PgmBuffer, SourceInfo};
pub use pipeline::input::{get_image_reference, FileSelection};
pub use pipeline::pgm::parse_header;
