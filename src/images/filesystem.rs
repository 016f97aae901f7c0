//! Filesystem-based image storage.
//!
//! Stores uploads as flat files in one directory:
//! ```text
//! {base_path}/
//!   {unix_ts}-{sanitized name}
//! ```
//!
//! and addresses them as `{public_base_url}/uploads/{file}`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::{sanitize_filename, ImageStore, ImageStoreError, Result, StoredImage};

/// URL path segment uploads are served under.
pub const UPLOADS_PATH: &str = "/uploads/";

/// Filesystem-based image store.
pub struct FilesystemImageStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemImageStore {
    /// Create a new filesystem image store.
    ///
    /// The base directory is created lazily on the first upload.
    pub fn new(base_path: impl AsRef<Path>, public_base_url: &str) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn url_for(&self, filename: &str) -> String {
        format!("{}{}{}", self.public_base_url, UPLOADS_PATH, filename)
    }

    /// Create `{stamp}-{name}`, or `{stamp}-{n}-{name}` when taken.
    async fn reserve(&self, stamp: u64, name: &str) -> Result<(String, fs::File)> {
        let mut n = 0u32;
        loop {
            let filename = if n == 0 {
                format!("{}-{}", stamp, name)
            } else {
                format!("{}-{}-{}", stamp, n, name)
            };

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.base_path.join(&filename))
                .await
            {
                Ok(file) => return Ok((filename, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Map a URL to a file inside the base directory.
    ///
    /// `None` when the URL is not under `{public_base_url}/uploads/`. Query
    /// strings and fragments are ignored. Names that could escape the
    /// directory are an error.
    fn path_for_url(&self, url: &str) -> Result<Option<PathBuf>> {
        let prefix = format!("{}{}", self.public_base_url, UPLOADS_PATH);
        let Some(rest) = url.strip_prefix(&prefix) else {
            return Ok(None);
        };
        let filename = rest.split(['?', '#']).next().unwrap_or_default();

        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(ImageStoreError::InvalidName(filename.to_string()));
        }

        Ok(Some(self.base_path.join(filename)))
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredImage> {
        if data.is_empty() {
            return Err(ImageStoreError::Empty);
        }

        fs::create_dir_all(&self.base_path).await?;

        let stamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let name = sanitize_filename(original_name);

        // Same second, same name: add a counter rather than overwrite. The
        // name is reserved by `create_new`, so concurrent uploads never share
        // a file.
        let (filename, mut file) = self.reserve(stamp, &name).await?;
        let path = self.base_path.join(&filename);

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %cleanup, "Failed to remove partial image");
            }
            return Err(e.into());
        }

        debug!(file = %filename, size = data.len(), "Stored image");

        Ok(StoredImage {
            url: self.url_for(&filename),
            filename,
        })
    }

    async fn delete_by_url(&self, url: &str) -> Result<bool> {
        let Some(path) = self.path_for_url(url)? else {
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "Deleted image");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
