//! Cover image upload configuration.

use serde::Deserialize;

/// Placeholder used for books created without a cover image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/300x450?text=No+Image";

/// Upload configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Local directory that receives uploaded files.
    pub dir: String,
    /// Maximum accepted multipart body size in bytes.
    pub max_bytes: usize,
    /// Base URL the uploaded files are reachable at (without `/uploads`).
    pub public_base_url: String,
    /// Image URL stored for books created without one.
    pub placeholder_image_url: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_bytes: 10 * 1024 * 1024,
            public_base_url: "http://localhost:8082".to_string(),
            placeholder_image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}
