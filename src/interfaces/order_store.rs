//! Order persistence interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Result;

/// Lifecycle of an order, carried on the wire as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn code(self) -> i64 {
        match self {
            OrderStatus::Pending => 100,
            OrderStatus::Processing => 101,
            OrderStatus::Shipped => 102,
            OrderStatus::Completed => 103,
            OrderStatus::Cancelled => 104,
        }
    }
}

/// A status code outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status code: {0}")]
pub struct UnknownStatus(pub i64);

impl TryFrom<i64> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        OrderStatus::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(UnknownStatus(code))
    }
}

impl From<OrderStatus> for i64 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

/// One requested line of a checkout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewLineItem {
    pub book_id: i64,
    pub quantity: i64,
    /// Unit price at purchase time.
    pub price: f64,
}

/// A checkout request: order header fields plus its line items.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    pub payment_method: String,
    pub total_amount: f64,
    #[serde(default)]
    pub details: Vec<NewLineItem>,
}

/// A stored order header, without line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderHeader {
    pub id: i64,
    pub order_code: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub payment_method: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    /// RFC 3339 creation timestamp.
    #[serde(rename = "date")]
    pub created_at: String,
}

/// Current catalog values for the book a line item references.
///
/// Both fields are `None` when the book has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub title: Option<String>,
    pub image: Option<String>,
}

/// A stored line item joined with its book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub id: i64,
    pub transaction_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    /// Price snapshot taken at purchase time.
    pub price: f64,
    pub book: BookSummary,
}

/// Persistence for orders and their line items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write header, line items and stock decrements as one transaction.
    ///
    /// Line items are applied in input order; each decrement only succeeds
    /// when the book has at least the requested stock. Any failure rolls
    /// back every write. Returns the new order id.
    ///
    /// Errors specific to this call:
    /// - `DuplicateOrderCode` when `order_code` is already taken
    /// - `BookNotFound` when a line references a missing book
    /// - `InsufficientStock` when a decrement would go below zero
    async fn insert_order(&self, order_code: &str, order: &NewOrder, created_at: &str)
        -> Result<i64>;

    /// All order headers, most recent first. Rows that cannot be decoded
    /// are logged and left out.
    async fn list_orders(&self) -> Result<Vec<OrderHeader>>;

    /// Line items of one order, in insertion order.
    async fn line_items(&self, order_id: i64) -> Result<Vec<LineItem>>;

    async fn find_by_code(&self, order_code: &str) -> Result<Option<OrderHeader>>;

    /// Returns false when no order has `order_id`.
    async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::try_from(status.code()), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(OrderStatus::try_from(99), Err(UnknownStatus(99)));
        assert_eq!(OrderStatus::try_from(105), Err(UnknownStatus(105)));
    }

    #[test]
    fn test_status_serializes_as_integer() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "102");

        let parsed: OrderStatus = serde_json::from_str("104").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);

        assert!(serde_json::from_str::<OrderStatus>("7").is_err());
    }
}
