//! Pipeline stages for image-to-PGM conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the resize filter or compositor)
//! without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ transform ──▶ pgm
//! (URL/path) (image)  (resize, overlay, grayscale)  (P5 bytes)
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path, URL, or file
//!    selection to a local file
//! 2. [`decode`]    — decode the bytes into a pixel grid; runs in
//!    `spawn_blocking` because decoding is CPU-bound
//! 3. [`transform`] — resize to the target width, optionally stamp the
//!    watermark, reduce to a luminance plane
//! 4. [`pgm`]       — serialise the plane into the byte-exact binary P5
//!    layout

pub mod decode;
pub mod input;
pub mod pgm;
pub mod transform;
