//! Book catalog service.
//!
//! Wraps [`CatalogStore`] with request validation, the placeholder cover
//! default, and cleanup of image files that a book no longer references.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::images::ImageStore;
use crate::interfaces::{Book, BookInput, CatalogStore, StorageError};

/// Errors surfaced by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("book {0} not found")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Catalog CRUD over a store and an image store.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    images: Arc<dyn ImageStore>,
    placeholder_image_url: String,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        images: Arc<dyn ImageStore>,
        placeholder_image_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            images,
            placeholder_image_url: placeholder_image_url.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.store.list_books().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Book, CatalogError> {
        self.store
            .get_book(id)
            .await?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Insert a book. An empty image becomes the placeholder URL.
    pub async fn create(&self, mut input: BookInput) -> Result<Book, CatalogError> {
        validate(&input)?;
        if input.image_url.trim().is_empty() {
            input.image_url = self.placeholder_image_url.clone();
        }

        let book = self.store.create_book(&input).await?;
        info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    /// Overwrite a book's fields.
    ///
    /// An empty image keeps the stored one. A different non-empty image
    /// replaces it, and the old file is removed once the row is updated.
    pub async fn update(&self, id: i64, mut input: BookInput) -> Result<(), CatalogError> {
        validate(&input)?;
        let existing = self.get(id).await?;

        if input.image_url.trim().is_empty() {
            input.image_url = existing.image_url.clone();
        }

        if !self.store.update_book(id, &input).await? {
            return Err(CatalogError::NotFound(id));
        }
        info!(book_id = id, "book updated");

        if input.image_url != existing.image_url {
            self.discard_image(&existing.image_url).await;
        }
        Ok(())
    }

    /// Delete a book and then its image file.
    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        let existing = self.get(id).await?;

        if !self.store.delete_book(id).await? {
            return Err(CatalogError::NotFound(id));
        }
        info!(book_id = id, "book deleted");

        self.discard_image(&existing.image_url).await;
        Ok(())
    }

    /// Best effort: failures are logged and swallowed. Files still used as
    /// another book's cover are kept.
    async fn discard_image(&self, url: &str) {
        if url.is_empty() || url == self.placeholder_image_url {
            return;
        }
        match self.store.count_by_image_url(url).await {
            Ok(0) => {}
            Ok(n) => {
                debug!(url, references = n, "image still in use, keeping file");
                return;
            }
            Err(e) => {
                warn!(url, error = %e, "failed to check image references, keeping file");
                return;
            }
        }
        if let Err(e) = self.images.delete_by_url(url).await {
            warn!(url, error = %e, "failed to delete stale image");
        }
    }
}

fn validate(input: &BookInput) -> Result<(), CatalogError> {
    if input.title.trim().is_empty() {
        return Err(CatalogError::Validation("title is required".to_string()));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(CatalogError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }
    if input.stock < 0 {
        return Err(CatalogError::Validation(
            "stock must not be negative".to_string(),
        ));
    }
    Ok(())
}
