//! Configuration types for image-to-PGM conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across tasks, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A positional constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::PgmError;
use serde::{Deserialize, Serialize};

/// Default overlay asset used by the watermark variant when the config does
/// not supply one. A fixed decorative logo, not user data — injectable via
/// [`ConversionConfigBuilder::overlay_source`] so tests can substitute their
/// own asset.
pub const DEFAULT_OVERLAY_PATH: &str = "gglogo.png";

/// Configuration for an image-to-PGM conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use img2pgm::{ConversionConfig, ResizeFilter};
///
/// let config = ConversionConfig::builder()
///     .filter(ResizeFilter::Triangle)
///     .download_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Resampling filter used when resizing to the target width. Default: [`ResizeFilter::Lanczos3`].
    ///
    /// Lanczos3 gives the sharpest downscaled output, which matters when the
    /// PGM is destined for a low-resolution thermal print head. Nearest is
    /// fastest and adequate for previews.
    pub filter: ResizeFilter,

    /// Overlay asset path or URL for the watermark variant.
    /// If None, [`DEFAULT_OVERLAY_PATH`] is used.
    pub overlay_source: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Maximum decoded image dimension (width or height) in pixels. Default: 10 000.
    ///
    /// A safety cap against decompression bombs: a small PNG can declare an
    /// enormous pixel grid and exhaust memory during decode. Either dimension
    /// above the cap aborts the conversion with
    /// [`PgmError::SourceTooLarge`](crate::PgmError::SourceTooLarge).
    pub max_source_pixels: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::default(),
            overlay_source: None,
            download_timeout_secs: 120,
            max_source_pixels: 10_000,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The effective overlay source for the watermark variant.
    pub fn overlay_source(&self) -> &str {
        self.overlay_source.as_deref().unwrap_or(DEFAULT_OVERLAY_PATH)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn filter(mut self, filter: ResizeFilter) -> Self {
        self.config.filter = filter;
        self
    }

    pub fn overlay_source(mut self, source: impl Into<String>) -> Self {
        self.config.overlay_source = Some(source.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_source_pixels(mut self, px: u32) -> Self {
        self.config.max_source_pixels = px;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, PgmError> {
        let c = &self.config;
        if c.max_source_pixels == 0 {
            return Err(PgmError::InvalidConfig(
                "max_source_pixels must be >= 1".into(),
            ));
        }
        if let Some(ref s) = c.overlay_source {
            if s.is_empty() {
                return Err(PgmError::InvalidConfig(
                    "overlay_source must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Resampling filter for the aspect-preserving resize.
///
/// The exact filter is an implementation choice, not part of the output
/// contract — only the output dimensions are. The three options trade speed
/// against sharpness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeFilter {
    /// Nearest-neighbour: fastest, blocky on downscale.
    Nearest,
    /// Linear (bilinear) interpolation: balanced.
    Triangle,
    /// Lanczos window 3: sharpest downscaled output. (default)
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    /// Map to the `image` crate's filter type.
    pub(crate) fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            ResizeFilter::Nearest => image::imageops::FilterType::Nearest,
            ResizeFilter::Triangle => image::imageops::FilterType::Triangle,
            ResizeFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}
