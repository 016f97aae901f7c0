//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Book catalog table schema.
#[derive(Iden)]
pub enum Books {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "title"]
    Title,
    #[iden = "author"]
    Author,
    #[iden = "price"]
    Price,
    #[iden = "category"]
    Category,
    #[iden = "stock"]
    Stock,
    #[iden = "image_url"]
    ImageUrl,
    #[iden = "description"]
    Description,
}

/// Order header table schema.
///
/// `order_code` is the human-readable business key and is unique.
#[derive(Iden)]
pub enum Transactions {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "order_code"]
    OrderCode,
    #[iden = "customer_name"]
    CustomerName,
    #[iden = "customer_email"]
    CustomerEmail,
    #[iden = "customer_phone"]
    CustomerPhone,
    #[iden = "customer_address"]
    CustomerAddress,
    #[iden = "payment_method"]
    PaymentMethod,
    #[iden = "total_amount"]
    TotalAmount,
    #[iden = "status"]
    Status,
    #[iden = "created_at"]
    CreatedAt,
}

/// Order line item table schema.
///
/// `book_id` carries no foreign key: books may be deleted after being sold,
/// and the line item keeps its price snapshot.
#[derive(Iden)]
pub enum TransactionDetails {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "transaction_id"]
    TransactionId,
    #[iden = "book_id"]
    BookId,
    #[iden = "quantity"]
    Quantity,
    #[iden = "price_at_purchase"]
    PriceAtPurchase,
}

/// Login users table schema.
#[derive(Iden)]
pub enum Users {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "username"]
    Username,
    #[iden = "password"]
    Password,
    #[iden = "role"]
    Role,
}

/// DDL applied at startup, one statement per entry.
pub const CREATE_SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0,
    category TEXT NOT NULL DEFAULT '',
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    image_url TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT ''
)"#,
    r#"
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_code TEXT NOT NULL UNIQUE,
    customer_name TEXT NOT NULL,
    customer_email TEXT,
    customer_phone TEXT,
    customer_address TEXT,
    payment_method TEXT NOT NULL,
    total_amount REAL NOT NULL,
    status INTEGER NOT NULL DEFAULT 100,
    created_at TEXT NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions(created_at)",
    r#"
CREATE TABLE IF NOT EXISTS transaction_details (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    transaction_id INTEGER NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    book_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    price_at_purchase REAL NOT NULL
)"#,
    "CREATE INDEX IF NOT EXISTS idx_transaction_details_tx ON transaction_details(transaction_id)",
    r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'admin'
)"#,
];
