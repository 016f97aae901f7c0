//! SQLite UserStore implementation.

use async_trait::async_trait;
use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};

use crate::interfaces::{Result, User, UserStore};
use crate::storage::schema::Users;

/// SQLite-backed login users.
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let query = Query::select()
            .columns([Users::Id, Users::Username, Users::Role])
            .from(Users::Table)
            .and_where(Expr::col(Users::Username).eq(username))
            .and_where(Expr::col(Users::Password).eq(password))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(User {
                id: row.try_get("id")?,
                username: row.try_get("username")?,
                role: row.try_get("role")?,
            })),
            None => Ok(None),
        }
    }

    async fn ensure_user(&self, username: &str, password: &str, role: &str) -> Result<bool> {
        let query = Query::insert()
            .into_table(Users::Table)
            .columns([Users::Username, Users::Password, Users::Role])
            .values_panic([username.into(), password.into(), role.into()])
            .on_conflict(OnConflict::column(Users::Username).do_nothing().to_owned())
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::interfaces::UserStore;
    use crate::storage::Stores;

    #[tokio::test]
    async fn test_credentials_must_both_match() {
        let stores = Stores::in_memory().await.unwrap();
        assert!(stores.users.ensure_user("admin", "s3cret", "admin").await.unwrap());

        let user = stores
            .users
            .find_by_credentials("admin", "s3cret")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, "admin");

        assert!(stores.users.find_by_credentials("admin", "wrong").await.unwrap().is_none());
        assert!(stores.users.find_by_credentials("nobody", "s3cret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_user_keeps_existing_row() {
        let stores = Stores::in_memory().await.unwrap();
        assert!(stores.users.ensure_user("admin", "first", "admin").await.unwrap());
        assert!(!stores.users.ensure_user("admin", "second", "staff").await.unwrap());

        assert!(stores.users.find_by_credentials("admin", "first").await.unwrap().is_some());
        assert!(stores.users.find_by_credentials("admin", "second").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quotes_in_credentials_are_escaped() {
        let stores = Stores::in_memory().await.unwrap();
        stores.users.ensure_user("o'brien", "pa'ss", "admin").await.unwrap();

        assert!(stores
            .users
            .find_by_credentials("o'brien", "pa'ss")
            .await
            .unwrap()
            .is_some());
        assert!(stores
            .users
            .find_by_credentials("' OR '1'='1", "' OR '1'='1")
            .await
            .unwrap()
            .is_none());
    }
}
