//! Error types for the img2pgm library.
//!
//! Every pipeline stage returns `Result<_, PgmError>` and the orchestrator
//! in [`crate::convert`] never lets a failure escape as a panic: a
//! conversion call yields either a complete, valid PGM buffer or a single
//! structured error. There is no partial output and no retry — a decode or
//! resize failure is terminal for that call.
//!
//! Variants carry enough context (path, URL, underlying library message) for
//! the caller to present a useful message to an end user without having to
//! inspect the pipeline internals.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the img2pgm library.
#[derive(Debug, Error)]
pub enum PgmError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A file-selection event carried an empty file list.
    #[error("No file selected")]
    NoFileSelected,

    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but no known image format matches.
    #[error("File is not a recognised image: '{path}'\nFirst bytes: {magic:?}")]
    NotAnImage { path: PathBuf, magic: [u8; 4] },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The image decoder rejected the source bytes.
    // NOTE: the field is `src`, not `source` — thiserror reserves a field
    // named `source` for the Error::source() chain, which requires an
    // Error-typed field.
    #[error("Failed to decode image '{src}': {detail}")]
    DecodeFailed { src: String, detail: String },

    /// The mandatory overlay asset failed to decode.
    ///
    /// The watermark variant aborts entirely when this happens — the overlay
    /// is not best-effort.
    #[error("Failed to decode overlay '{path}': {detail}")]
    OverlayDecodeFailed { path: String, detail: String },

    /// A decoded dimension exceeds the configured safety cap.
    #[error("Source image is {width}x{height}, exceeding the {max}px dimension cap")]
    SourceTooLarge { width: u32, height: u32, max: u32 },

    // ── Transform errors ──────────────────────────────────────────────────
    /// Target width must be at least 1 pixel.
    #[error("Invalid target width {width}: must be >= 1")]
    InvalidWidth { width: u32 },

    // ── PGM errors ────────────────────────────────────────────────────────
    /// A byte buffer does not start with a valid binary PGM (P5) header.
    #[error("Invalid PGM data: {detail}")]
    InvalidPgm { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
