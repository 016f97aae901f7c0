//! User lookup for the login gate.

use async_trait::async_trait;

use super::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user whose username and password both match.
    async fn find_by_credentials(&self, username: &str, password: &str) -> Result<Option<User>>;

    /// Insert the user unless the username is already taken.
    ///
    /// Returns true when a row was inserted.
    async fn ensure_user(&self, username: &str, password: &str, role: &str) -> Result<bool>;
}
