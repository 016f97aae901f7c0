//! Book catalog interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Result;

/// A catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    /// Cover image URL; stored as `image_url`.
    #[serde(rename = "image")]
    pub image_url: String,
    pub description: String,
}

/// Writable book fields, used for both create and full update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    #[serde(rename = "image")]
    pub image_url: String,
    pub description: String,
}

impl BookInput {
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            price: self.price,
            category: self.category,
            stock: self.stock,
            image_url: self.image_url,
            description: self.description,
        }
    }
}

/// Persistence for the book catalog.
///
/// Stock is only written here by full updates; checkout decrements it
/// through [`super::OrderStore::insert_order`] inside the order's transaction.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All books, newest id first.
    async fn list_books(&self) -> Result<Vec<Book>>;

    async fn get_book(&self, id: i64) -> Result<Option<Book>>;

    /// Insert a book and return it with its assigned id.
    async fn create_book(&self, input: &BookInput) -> Result<Book>;

    /// Overwrite every writable field. Returns false when no row has `id`.
    async fn update_book(&self, id: i64, input: &BookInput) -> Result<bool>;

    /// Returns false when no row has `id`.
    async fn delete_book(&self, id: i64) -> Result<bool>;

    /// Number of books whose cover is `image_url`.
    async fn count_by_image_url(&self, image_url: &str) -> Result<i64>;
}
