//! Order engine: checkout, listing, status updates and lookup by code.
//!
//! Checkout is the one write path that touches several tables. The engine
//! validates the request, picks an order code and hands the whole write to
//! [`OrderStore::insert_order`], which runs it as a single transaction.
//! A code collision reported by storage is retried with a fresh code; every
//! attempt is bounded by the configured transaction timeout.

pub mod code;

use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::OrdersConfig;
use crate::interfaces::{
    LineItem, NewOrder, OrderHeader, OrderStatus, OrderStore, StorageError,
};
use crate::utils::retry::order_code_backoff;

pub use code::{CodeSource, OrderCodeGenerator};

/// Errors surfaced by the order engine.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("book not found: {0}")]
    UnknownBook(i64),

    #[error("insufficient stock for book {book_id}: requested {requested}, available {available}")]
    InsufficientStock {
        book_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("order code already exists: {0}")]
    DuplicateCode(String),

    #[error("checkout timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateOrderCode(code) => OrderError::DuplicateCode(code),
            StorageError::BookNotFound(id) => OrderError::UnknownBook(id),
            StorageError::InsufficientStock {
                book_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                book_id,
                requested,
                available,
            },
            other => OrderError::Storage(other),
        }
    }
}

/// Identifiers of a committed checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutReceipt {
    pub order_code: String,
    pub transaction_id: i64,
}

/// An order header with its line items.
///
/// When the line items could not be read, `details` is empty,
/// `details_complete` is false and `warning` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    #[serde(flatten)]
    pub header: OrderHeader,
    pub details: Vec<LineItem>,
    pub details_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Checkout and order queries over an [`OrderStore`].
pub struct OrderEngine {
    store: Arc<dyn OrderStore>,
    codes: Arc<dyn CodeSource>,
    timeout: Duration,
    max_code_attempts: usize,
}

impl OrderEngine {
    pub fn new(store: Arc<dyn OrderStore>, config: &OrdersConfig) -> Self {
        Self {
            store,
            codes: Arc::new(OrderCodeGenerator::new(config.code_prefix.clone())),
            timeout: config.transaction_timeout(),
            max_code_attempts: config.max_code_attempts.max(1),
        }
    }

    /// Replace the order code source.
    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    /// Validate and commit a checkout.
    pub async fn checkout(&self, order: NewOrder) -> Result<CheckoutReceipt, OrderError> {
        validate(&order)?;

        let order = &order;
        let attempt = || async move {
            let order_code = self.codes.next_code();
            let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

            let transaction_id = tokio::time::timeout(
                self.timeout,
                self.store.insert_order(&order_code, order, &created_at),
            )
            .await
            .map_err(|_| OrderError::Timeout(self.timeout))??;

            Ok::<_, OrderError>(CheckoutReceipt {
                order_code,
                transaction_id,
            })
        };

        let receipt = attempt
            .retry(order_code_backoff(self.max_code_attempts))
            .when(|e: &OrderError| matches!(e, OrderError::DuplicateCode(_)))
            .notify(|e: &OrderError, dur: Duration| {
                warn!(error = %e, delay = ?dur, "order code collision, retrying");
            })
            .await?;

        info!(
            order_code = %receipt.order_code,
            transaction_id = receipt.transaction_id,
            items = order.details.len(),
            "checkout committed"
        );
        Ok(receipt)
    }

    /// All orders, most recent first, each with its line items.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        let headers = self.store.list_orders().await?;

        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            orders.push(self.with_details(header).await);
        }
        Ok(orders)
    }

    /// Set an order's status. Setting the current status again is a no-op
    /// success.
    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<(), OrderError> {
        if !self.store.update_status(order_id, status).await? {
            return Err(OrderError::NotFound(format!("order {}", order_id)));
        }
        info!(order_id, status = status.code(), "order status updated");
        Ok(())
    }

    /// Look up one order by its exact code.
    pub async fn find_by_code(&self, order_code: &str) -> Result<Order, OrderError> {
        if order_code.trim().is_empty() {
            return Err(OrderError::Validation("order code is required".to_string()));
        }

        let header = self
            .store
            .find_by_code(order_code)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("order {}", order_code)))?;

        Ok(self.with_details(header).await)
    }

    async fn with_details(&self, header: OrderHeader) -> Order {
        match self.store.line_items(header.id).await {
            Ok(details) => Order {
                header,
                details,
                details_complete: true,
                warning: None,
            },
            Err(e) => {
                warn!(order_id = header.id, error = %e, "failed to load order line items");
                Order {
                    header,
                    details: Vec::new(),
                    details_complete: false,
                    warning: Some(format!("line items unavailable: {}", e)),
                }
            }
        }
    }
}

/// Reject requests that can never be committed.
pub fn validate(order: &NewOrder) -> Result<(), OrderError> {
    let invalid = |msg: &str| Err(OrderError::Validation(msg.to_string()));

    if order.customer_name.trim().is_empty() {
        return invalid("customer_name is required");
    }
    if order.payment_method.trim().is_empty() {
        return invalid("payment_method is required");
    }
    if !order.total_amount.is_finite() || order.total_amount < 0.0 {
        return invalid("total_amount must be a non-negative number");
    }
    if order.details.is_empty() {
        return invalid("order must contain at least one item");
    }
    for item in &order.details {
        if item.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "quantity for book {} must be positive",
                item.book_id
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(OrderError::Validation(format!(
                "price for book {} must be a non-negative number",
                item.book_id
            )));
        }
    }
    Ok(())
}
