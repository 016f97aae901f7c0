//! SQLite OrderStore implementation.

use async_trait::async_trait;
use sea_query::{Alias, Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::interfaces::{
    BookSummary, LineItem, NewLineItem, NewOrder, OrderHeader, OrderStatus, OrderStore, Result,
    StorageError,
};
use crate::storage::schema::{Books, TransactionDetails, Transactions};

/// SQLite-backed order store.
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn select_headers() -> sea_query::SelectStatement {
        Query::select()
            .columns([
                Transactions::Id,
                Transactions::OrderCode,
                Transactions::CustomerName,
                Transactions::CustomerEmail,
                Transactions::CustomerPhone,
                Transactions::CustomerAddress,
                Transactions::PaymentMethod,
                Transactions::TotalAmount,
                Transactions::Status,
                Transactions::CreatedAt,
            ])
            .from(Transactions::Table)
            .to_owned()
    }

    fn header_from_row(row: &SqliteRow) -> Result<OrderHeader> {
        let code: i64 = row.try_get("status")?;
        let status = OrderStatus::try_from(code).map_err(|e| StorageError::CorruptRow {
            table: "transactions",
            reason: e.to_string(),
        })?;

        Ok(OrderHeader {
            id: row.try_get("id")?,
            order_code: row.try_get("order_code")?,
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
            customer_phone: row.try_get("customer_phone")?,
            customer_address: row.try_get("customer_address")?,
            payment_method: row.try_get("payment_method")?,
            total_amount: row.try_get("total_amount")?,
            status,
            created_at: row.try_get("created_at")?,
        })
    }

    fn line_item_from_row(row: &SqliteRow) -> Result<LineItem> {
        Ok(LineItem {
            id: row.try_get("id")?,
            transaction_id: row.try_get("transaction_id")?,
            book_id: row.try_get("book_id")?,
            quantity: row.try_get("quantity")?,
            price: row.try_get("price_at_purchase")?,
            book: BookSummary {
                title: row.try_get("book_title")?,
                image: row.try_get("book_image")?,
            },
        })
    }
}

/// Insert the header row. A taken order code surfaces as `DuplicateOrderCode`.
async fn insert_header(
    conn: &mut SqliteConnection,
    order_code: &str,
    order: &NewOrder,
    created_at: &str,
) -> Result<i64> {
    let query = Query::insert()
        .into_table(Transactions::Table)
        .columns([
            Transactions::OrderCode,
            Transactions::CustomerName,
            Transactions::CustomerEmail,
            Transactions::CustomerPhone,
            Transactions::CustomerAddress,
            Transactions::PaymentMethod,
            Transactions::TotalAmount,
            Transactions::Status,
            Transactions::CreatedAt,
        ])
        .values_panic([
            order_code.into(),
            order.customer_name.clone().into(),
            order.customer_email.clone().into(),
            order.customer_phone.clone().into(),
            order.customer_address.clone().into(),
            order.payment_method.clone().into(),
            order.total_amount.into(),
            OrderStatus::Pending.code().into(),
            created_at.into(),
        ])
        .to_string(SqliteQueryBuilder);

    match sqlx::query(&query).execute(&mut *conn).await {
        Ok(result) => Ok(result.last_insert_rowid()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(StorageError::DuplicateOrderCode(order_code.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Record one line item and take its quantity out of stock.
async fn apply_line_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    item: &NewLineItem,
) -> Result<()> {
    let insert = Query::insert()
        .into_table(TransactionDetails::Table)
        .columns([
            TransactionDetails::TransactionId,
            TransactionDetails::BookId,
            TransactionDetails::Quantity,
            TransactionDetails::PriceAtPurchase,
        ])
        .values_panic([
            order_id.into(),
            item.book_id.into(),
            item.quantity.into(),
            item.price.into(),
        ])
        .to_string(SqliteQueryBuilder);
    sqlx::query(&insert).execute(&mut *conn).await?;

    let decrement = Query::update()
        .table(Books::Table)
        .value(
            Books::Stock,
            Expr::col(Books::Stock).sub(item.quantity),
        )
        .and_where(Expr::col(Books::Id).eq(item.book_id))
        .and_where(Expr::col(Books::Stock).gte(item.quantity))
        .to_string(SqliteQueryBuilder);
    let result = sqlx::query(&decrement).execute(&mut *conn).await?;
    if result.rows_affected() == 1 {
        return Ok(());
    }

    // Nothing updated: either the book is gone or it has too few copies.
    let lookup = Query::select()
        .column(Books::Stock)
        .from(Books::Table)
        .and_where(Expr::col(Books::Id).eq(item.book_id))
        .to_string(SqliteQueryBuilder);
    let row = sqlx::query(&lookup).fetch_optional(&mut *conn).await?;

    match row {
        None => Err(StorageError::BookNotFound(item.book_id)),
        Some(row) => Err(StorageError::InsufficientStock {
            book_id: item.book_id,
            requested: item.quantity,
            available: row.try_get("stock")?,
        }),
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert_order(
        &self,
        order_code: &str,
        order: &NewOrder,
        created_at: &str,
    ) -> Result<i64> {
        // Rolled back on drop unless committed, including when the caller's
        // future is cancelled mid-way.
        let mut tx = self.pool.begin().await?;

        let order_id = insert_header(&mut tx, order_code, order, created_at).await?;
        for item in &order.details {
            apply_line_item(&mut tx, order_id, item).await?;
        }

        tx.commit().await?;
        debug!(order_code, order_id, items = order.details.len(), "order committed");
        Ok(order_id)
    }

    async fn list_orders(&self) -> Result<Vec<OrderHeader>> {
        let query = Self::select_headers()
            .order_by(Transactions::CreatedAt, Order::Desc)
            .order_by(Transactions::Id, Order::Desc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let mut headers = Vec::with_capacity(rows.len());
        for row in &rows {
            match Self::header_from_row(row) {
                Ok(header) => headers.push(header),
                Err(e) => warn!(error = %e, "skipping unreadable order row"),
            }
        }
        Ok(headers)
    }

    async fn line_items(&self, order_id: i64) -> Result<Vec<LineItem>> {
        let query = Query::select()
            .columns([
                (TransactionDetails::Table, TransactionDetails::Id),
                (TransactionDetails::Table, TransactionDetails::TransactionId),
                (TransactionDetails::Table, TransactionDetails::BookId),
                (TransactionDetails::Table, TransactionDetails::Quantity),
                (TransactionDetails::Table, TransactionDetails::PriceAtPurchase),
            ])
            .expr_as(
                Expr::col((Books::Table, Books::Title)),
                Alias::new("book_title"),
            )
            .expr_as(
                Expr::col((Books::Table, Books::ImageUrl)),
                Alias::new("book_image"),
            )
            .from(TransactionDetails::Table)
            .left_join(
                Books::Table,
                Expr::col((Books::Table, Books::Id))
                    .equals((TransactionDetails::Table, TransactionDetails::BookId)),
            )
            .and_where(Expr::col((TransactionDetails::Table, TransactionDetails::TransactionId)).eq(order_id))
            .order_by((TransactionDetails::Table, TransactionDetails::Id), Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(Self::line_item_from_row).collect()
    }

    async fn find_by_code(&self, order_code: &str) -> Result<Option<OrderHeader>> {
        let query = Self::select_headers()
            .and_where(Expr::col(Transactions::OrderCode).eq(order_code))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::header_from_row).transpose()
    }

    async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<bool> {
        let query = Query::update()
            .table(Transactions::Table)
            .value(Transactions::Status, status.code())
            .and_where(Expr::col(Transactions::Id).eq(order_id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
