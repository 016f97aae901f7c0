//! Bookstore - admin backend for a small bookstore
//!
//! Book catalog CRUD, checkout with atomic stock decrement, order tracking,
//! cover image uploads and a login gate, served as a JSON HTTP API over
//! SQLite.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod handlers;
pub mod images;
pub mod interfaces;
pub mod orders;
pub mod storage;
pub mod utils;
