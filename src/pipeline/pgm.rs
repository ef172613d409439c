//! PGM (P5) encoding: `GrayImage` → byte-exact binary GrayMap.
//!
//! The binary PGM layout is rigid and trivially simple, which is exactly why
//! thermal-printer firmwares and OCR front-ends consume it:
//!
//! ```text
//! "P5\n"
//! "<width> <height>\n"
//! "255\n"
//! <width*height bytes, row-major, one byte per pixel>
//! ```
//!
//! No trailing data, no alternate whitespace, ASCII digits with no leading
//! zeros. [`encode`] produces that layout byte-for-byte; [`parse_header`]
//! recovers the dimensions from it so consumers (and the round-trip tests)
//! can validate output without a full PNM decoder.

use crate::error::PgmError;
use crate::output::PgmBuffer;
use image::GrayImage;
use tracing::debug;

/// PGM binary magic number.
const MAGIC: &[u8] = b"P5";

/// Maximum gray value emitted in the header. The plane is always 8-bit.
const MAXVAL: u32 = 255;

/// Encode a grayscale image as a binary PGM buffer.
///
/// Precondition: the image is already a single-channel luminance plane —
/// the pipeline grayscales before encoding, so each byte read here is the
/// pixel's true intensity.
pub fn encode(img: &GrayImage) -> PgmBuffer {
    let (w, h) = img.dimensions();
    let header = format!("P5\n{w} {h}\n{MAXVAL}\n");

    let plane = (w as usize) * (h as usize);
    let mut data = Vec::with_capacity(header.len() + plane);
    data.extend_from_slice(header.as_bytes());

    // Row-major: y outer, x inner. GrayImage stores its samples in exactly
    // this order, so the raw container can be appended wholesale.
    data.extend_from_slice(img.as_raw());
    debug_assert_eq!(data.len(), header.len() + plane);

    debug!(w, h, bytes = data.len(), "Encoded PGM buffer");
    PgmBuffer::new(w, h, data)
}

/// Parse a binary PGM header, returning `(width, height)`.
///
/// Accepts exactly the layout [`encode`] emits: `P5`, single newline,
/// width, single space, height, single newline, maxval `255`, single
/// newline. When the buffer extends past the header, the body must hold at
/// least `width * height` plane bytes.
pub fn parse_header(bytes: &[u8]) -> Result<(u32, u32), PgmError> {
    let rest = bytes
        .strip_prefix(MAGIC)
        .and_then(|r| r.strip_prefix(b"\n"))
        .ok_or_else(|| PgmError::InvalidPgm {
            detail: "missing P5 magic".into(),
        })?;

    let (width, rest) = parse_dimension(rest, b' ')?;
    let (height, rest) = parse_dimension(rest, b'\n')?;

    let body = rest
        .strip_prefix(b"255\n")
        .ok_or_else(|| PgmError::InvalidPgm {
            detail: "maxval must be 255".into(),
        })?;

    let plane = (width as usize) * (height as usize);
    if body.len() < plane {
        return Err(PgmError::InvalidPgm {
            detail: format!("body holds {} bytes, expected {}", body.len(), plane),
        });
    }

    Ok((width, height))
}

/// Read ASCII digits up to `terminator`, rejecting empty runs, leading
/// zeros, and values that do not fit in u32.
fn parse_dimension(bytes: &[u8], terminator: u8) -> Result<(u32, &[u8]), PgmError> {
    let end = bytes
        .iter()
        .position(|&b| b == terminator)
        .ok_or_else(|| PgmError::InvalidPgm {
            detail: "truncated header".into(),
        })?;
    let digits = &bytes[..end];

    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(PgmError::InvalidPgm {
            detail: "dimension is not a decimal integer".into(),
        });
    }
    if digits.len() > 1 && digits[0] == b'0' {
        return Err(PgmError::InvalidPgm {
            detail: "dimension has a leading zero".into(),
        });
    }

    let text = std::str::from_utf8(digits).map_err(|_| PgmError::InvalidPgm {
        detail: "dimension is not ASCII".into(),
    })?;
    let value = text.parse::<u32>().map_err(|_| PgmError::InvalidPgm {
        detail: format!("dimension '{text}' out of range"),
    })?;
    if value == 0 {
        return Err(PgmError::InvalidPgm {
            detail: "dimension must be >= 1".into(),
        });
    }

    Ok((value, &bytes[end + 1..]))
}
