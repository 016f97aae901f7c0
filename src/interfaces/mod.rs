//! Storage interfaces and the records they exchange.
//!
//! Each store is a trait so the order engine, the catalog service and the
//! HTTP layer depend on behaviour rather than on SQLite. The SQLite
//! implementations live in [`crate::storage::sqlite`].

pub mod catalog_store;
pub mod order_store;
pub mod user_store;

pub use catalog_store::{Book, BookInput, CatalogStore};
pub use order_store::{
    BookSummary, LineItem, NewLineItem, NewOrder, OrderHeader, OrderStatus, OrderStore,
    UnknownStatus,
};
pub use user_store::{User, UserStore};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("order code already exists: {0}")]
    DuplicateOrderCode(String),

    #[error("book not found: {0}")]
    BookNotFound(i64),

    #[error("insufficient stock for book {book_id}: requested {requested}, available {available}")]
    InsufficientStock {
        book_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
