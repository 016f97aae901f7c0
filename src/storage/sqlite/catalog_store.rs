//! SQLite CatalogStore implementation.

use async_trait::async_trait;
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::interfaces::{Book, BookInput, CatalogStore, Result};
use crate::storage::schema::Books;

/// SQLite-backed book catalog.
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn select_books() -> sea_query::SelectStatement {
        Query::select()
            .columns([
                Books::Id,
                Books::Title,
                Books::Author,
                Books::Price,
                Books::Category,
                Books::Stock,
                Books::ImageUrl,
                Books::Description,
            ])
            .from(Books::Table)
            .to_owned()
    }

    fn book_from_row(row: &SqliteRow) -> Result<Book> {
        Ok(Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            stock: row.try_get("stock")?,
            image_url: row.try_get("image_url")?,
            description: row.try_get("description")?,
        })
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn list_books(&self) -> Result<Vec<Book>> {
        let query = Self::select_books()
            .order_by(Books::Id, Order::Desc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(Self::book_from_row).collect()
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let query = Self::select_books()
            .and_where(Expr::col(Books::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::book_from_row).transpose()
    }

    async fn create_book(&self, input: &BookInput) -> Result<Book> {
        let query = Query::insert()
            .into_table(Books::Table)
            .columns([
                Books::Title,
                Books::Author,
                Books::Price,
                Books::Category,
                Books::Stock,
                Books::ImageUrl,
                Books::Description,
            ])
            .values_panic([
                input.title.clone().into(),
                input.author.clone().into(),
                input.price.into(),
                input.category.clone().into(),
                input.stock.into(),
                input.image_url.clone().into(),
                input.description.clone().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(input.clone().into_book(result.last_insert_rowid()))
    }

    async fn update_book(&self, id: i64, input: &BookInput) -> Result<bool> {
        let query = Query::update()
            .table(Books::Table)
            .values([
                (Books::Title, input.title.clone().into()),
                (Books::Author, input.author.clone().into()),
                (Books::Price, input.price.into()),
                (Books::Category, input.category.clone().into()),
                (Books::Stock, input.stock.into()),
                (Books::ImageUrl, input.image_url.clone().into()),
                (Books::Description, input.description.clone().into()),
            ])
            .and_where(Expr::col(Books::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_book(&self, id: i64) -> Result<bool> {
        let query = Query::delete()
            .from_table(Books::Table)
            .and_where(Expr::col(Books::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_image_url(&self, image_url: &str) -> Result<i64> {
        let query = Query::select()
            .expr(Expr::col(Books::Id).count())
            .from(Books::Table)
            .and_where(Expr::col(Books::ImageUrl).eq(image_url))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::interfaces::{BookInput, CatalogStore};
    use crate::storage::Stores;

    fn input(title: &str, stock: i64) -> BookInput {
        BookInput {
            title: title.to_string(),
            author: "Pramoedya".to_string(),
            price: 12.5,
            category: "Fiction".to_string(),
            stock,
            image_url: "http://localhost:8082/uploads/1-cover.jpg".to_string(),
            description: "A quartet opener".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let stores = Stores::in_memory().await.unwrap();

        let created = stores.catalog.create_book(&input("Bumi Manusia", 4)).await.unwrap();
        assert!(created.id > 0);

        let fetched = stores.catalog.get_book(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.stock, 4);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let stores = Stores::in_memory().await.unwrap();
        let first = stores.catalog.create_book(&input("First", 1)).await.unwrap();
        let second = stores.catalog.create_book(&input("Second", 1)).await.unwrap();

        let books = stores.catalog.list_books().await.unwrap();
        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let stores = Stores::in_memory().await.unwrap();
        assert!(!stores.catalog.update_book(42, &input("Ghost", 1)).await.unwrap());
        assert!(!stores.catalog.delete_book(42).await.unwrap());

        let book = stores.catalog.create_book(&input("Real", 1)).await.unwrap();
        let mut changed = input("Real, revised", 9);
        changed.price = 20.0;
        assert!(stores.catalog.update_book(book.id, &changed).await.unwrap());

        let fetched = stores.catalog.get_book(book.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Real, revised");
        assert_eq!(fetched.stock, 9);
        assert_eq!(fetched.price, 20.0);

        assert!(stores.catalog.delete_book(book.id).await.unwrap());
        assert!(stores.catalog.get_book(book.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let stores = Stores::in_memory().await.unwrap();
        assert!(stores.catalog.create_book(&input("Oversold", -1)).await.is_err());
    }

    #[tokio::test]
    async fn test_count_by_image_url() {
        let stores = Stores::in_memory().await.unwrap();
        let shared = input("Shared", 1);
        assert_eq!(stores.catalog.count_by_image_url(&shared.image_url).await.unwrap(), 0);

        stores.catalog.create_book(&shared).await.unwrap();
        stores.catalog.create_book(&input("Also shared", 1)).await.unwrap();
        let mut other = input("Own cover", 1);
        other.image_url = "http://localhost:8082/uploads/2-other.jpg".to_string();
        stores.catalog.create_book(&other).await.unwrap();

        assert_eq!(stores.catalog.count_by_image_url(&shared.image_url).await.unwrap(), 2);
        assert_eq!(stores.catalog.count_by_image_url(&other.image_url).await.unwrap(), 1);
    }
}
