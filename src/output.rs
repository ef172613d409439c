//! Output types: the encoded PGM buffer and source metadata.

use serde::{Deserialize, Serialize};

/// An encoded binary PGM (P5) image.
///
/// Owns the complete byte stream — ASCII header followed by the row-major
/// luminance plane — and the dimensions it was encoded with. Immutable after
/// construction; ownership transfers to the caller, who typically hands the
/// bytes to a printer driver, file, or socket via [`PgmBuffer::into_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgmBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PgmBuffer {
    /// Assemble a buffer from its parts. Only the encoder constructs these.
    pub(crate) fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert!(data.len() > (width as usize) * (height as usize));
        Self {
            width,
            height,
            data,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The full encoded stream: header plus pixel plane.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, yielding the encoded stream.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Total encoded length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer holds no bytes. Never the case for a buffer
    /// produced by the encoder.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The pixel plane: exactly `width * height` luminance bytes,
    /// row-major.
    pub fn pixels(&self) -> &[u8] {
        let plane = (self.width as usize) * (self.height as usize);
        &self.data[self.data.len() - plane..]
    }
}

impl AsRef<[u8]> for PgmBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Metadata about a source image, reported by [`crate::convert::inspect`]
/// without performing a full decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Detected container format (e.g. "png", "jpeg"), if recognised.
    pub format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_returns_trailing_plane() {
        let data = b"P5\n2 2\n255\n\x01\x02\x03\x04".to_vec();
        let buf = PgmBuffer::new(2, 2, data);
        assert_eq!(buf.pixels(), &[1, 2, 3, 4]);
        assert_eq!(buf.len(), 15);
        assert!(!buf.is_empty());
    }
}
