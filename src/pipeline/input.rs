//! Input resolution: normalise a user-supplied path, URL, or file selection
//! to a local image file.
//!
//! ## Why download to a temp file?
//!
//! Keeping one decode path (always a file on disk) means the decoder never
//! cares where the bytes came from. Downloading to a `TempDir` gives us a
//! path to decode while ensuring cleanup happens automatically when
//! `ResolvedInput` is dropped, even if the process panics. We sniff the
//! image magic bytes before returning so callers get a meaningful error
//! rather than a decoder failure on an HTML error page.

use crate::error::PgmError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The resolved input — either a local path or a downloaded temp file.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; image downloaded to a temp directory.
    /// The `TempDir` is kept alive to prevent cleanup until the decoder has
    /// consumed the bytes.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Get the path to the image file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// A file-selection event from a UI layer, reduced to its interface
/// boundary: the list of selected file paths.
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    /// Selected file paths, in selection order.
    pub files: Vec<String>,
}

impl FileSelection {
    /// A selection holding the given paths.
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }
}

/// Extract an image reference from a file selection.
///
/// Returns the first selected file's path, or
/// [`PgmError::NoFileSelected`] when the selection is empty. The returned
/// string feeds straight into [`crate::convert::convert`]; no transient
/// handle is allocated, so there is nothing for the caller to release.
pub fn get_image_reference(selection: &FileSelection) -> Result<String, PgmError> {
    selection
        .files
        .first()
        .cloned()
        .ok_or(PgmError::NoFileSelected)
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local image file path.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
/// Either way the content must carry a recognisable image magic number.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, PgmError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and image magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, PgmError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(PgmError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            // Sniff enough bytes for format detection
            let mut head = [0u8; 32];
            let n = f.read(&mut head).unwrap_or(0);
            sniff_image_magic(&head[..n], &path)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PgmError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PgmError::FileNotFound { path });
        }
    }

    debug!("Resolved local image: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, PgmError> {
    // A well-formed URL passes through unchanged; a malformed one fails
    // before any network traffic.
    let parsed = reqwest::Url::parse(url).map_err(|_| PgmError::InvalidInput {
        input: url.to_string(),
    })?;

    info!("Downloading image from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PgmError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(parsed).send().await.map_err(|e| {
        if e.is_timeout() {
            PgmError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PgmError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PgmError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| PgmError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PgmError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    sniff_image_magic(&bytes, &file_path)?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| PgmError::Internal(format!("Failed to write temp file: {e}")))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Reject content whose leading bytes match no known image format.
fn sniff_image_magic(head: &[u8], path: &Path) -> Result<(), PgmError> {
    if image::guess_format(head).is_err() {
        let mut magic = [0u8; 4];
        let n = head.len().min(4);
        magic[..n].copy_from_slice(&head[..n]);
        return Err(PgmError::NotAnImage {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.img".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/logo.png"));
        assert!(is_url("http://example.com/logo.png"));
        assert!(!is_url("/tmp/logo.png"));
        assert!(!is_url("logo.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn empty_selection_fails() {
        let result = get_image_reference(&FileSelection::default());
        assert!(matches!(result, Err(PgmError::NoFileSelected)));
    }

    #[test]
    fn selection_returns_first_file() {
        let selection = FileSelection::new(vec!["a.png".into(), "b.png".into()]);
        assert_eq!(get_image_reference(&selection).unwrap(), "a.png");
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(
            extract_filename("https://example.com/assets/logo.png"),
            "logo.png"
        );
        assert_eq!(extract_filename("https://example.com/"), "downloaded.img");
        assert_eq!(extract_filename("not a url"), "downloaded.img");
    }

    #[tokio::test]
    async fn malformed_url_fails_before_network() {
        let result = resolve_input("http://[not-a-host/img.png", 5).await;
        assert!(matches!(result, Err(PgmError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn missing_local_file_fails() {
        let result = resolve_input("/nonexistent/image.png", 5).await;
        assert!(matches!(result, Err(PgmError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn non_image_content_fails_magic_sniff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, b"<html><body>404</body></html>").unwrap();

        let result = resolve_input(path.to_str().unwrap(), 5).await;
        assert!(matches!(result, Err(PgmError::NotAnImage { .. })));
    }

    #[tokio::test]
    async fn valid_png_file_resolves_locally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        img.save(&path).unwrap();

        let resolved = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(resolved.path(), path.as_path());
    }
}
