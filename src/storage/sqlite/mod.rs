//! SQLite implementations of storage interfaces.

mod catalog_store;
mod order_store;
mod user_store;

pub use catalog_store::SqliteCatalogStore;
pub use order_store::SqliteOrderStore;
pub use user_store::SqliteUserStore;
