//! Cover image storage.
//!
//! Uploaded images are kept as plain files and addressed by public URL. Book
//! rows store that URL; deleting or replacing a book's image removes the file
//! behind the old URL when it points into the upload directory.

mod filesystem;

pub use filesystem::FilesystemImageStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during image store operations.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("Invalid image name: {0}")]
    InvalidName(String),

    #[error("Image is empty")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for image store operations.
pub type Result<T> = std::result::Result<T, ImageStoreError>;

/// A stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// File name inside the upload directory.
    pub filename: String,
    /// Public URL the file is served at.
    pub url: String,
}

/// Blob storage for book cover images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an upload under a unique name derived from `original_name`.
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredImage>;

    /// Delete the file a URL points at.
    ///
    /// Only URLs under this store's own public base are considered. Returns
    /// `Ok(false)` for any other URL (placeholders, other hosts) and for
    /// files that are already gone.
    async fn delete_by_url(&self, url: &str) -> Result<bool>;
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`.
///
/// Path components are dropped, leading dots stripped, and an empty result
/// becomes `image`.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_simple_names() {
        assert_eq!(sanitize_filename("harrypotter.jpg"), "harrypotter.jpg");
        assert_eq!(sanitize_filename("cover_v2-final.png"), "cover_v2-final.png");
    }

    #[test]
    fn test_sanitize_strips_paths_and_odd_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\my cover.jpg"), "my_cover.jpg");
        assert_eq!(sanitize_filename("buku baru (1).jpg"), "buku_baru__1_.jpg");
    }

    #[test]
    fn test_sanitize_never_empty() {
        assert_eq!(sanitize_filename(""), "image");
        assert_eq!(sanitize_filename("..."), "image");
        assert_eq!(sanitize_filename("dir/"), "image");
    }
}
