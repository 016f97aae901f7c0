//! Login gate.
//!
//! Checks a username and password against the users table and hands back a
//! static token. Passwords are compared as stored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{AuthConfig, SeedUser};
use crate::interfaces::{StorageError, UserStore};

/// Errors surfaced by the login gate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginResponse {
    pub status: bool,
    pub message: String,
    pub token: String,
    pub role: String,
    pub username: String,
}

pub struct AuthGate {
    users: Arc<dyn UserStore>,
    token: String,
}

impl AuthGate {
    pub fn new(users: Arc<dyn UserStore>, config: &AuthConfig) -> Self {
        Self {
            users,
            token: config.token.clone(),
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .find_by_credentials(&request.username, &request.password)
            .await?;

        match user {
            Some(user) => {
                info!(username = %user.username, role = %user.role, "login succeeded");
                Ok(LoginResponse {
                    status: true,
                    message: "Login successful".to_string(),
                    token: self.token.clone(),
                    role: user.role,
                    username: user.username,
                })
            }
            None => {
                warn!(username = %request.username, "login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Insert the configured seed user if its username is free.
    pub async fn seed(&self, seed: &SeedUser) -> Result<(), AuthError> {
        let inserted = self
            .users
            .ensure_user(&seed.username, &seed.password, &seed.role)
            .await?;
        if inserted {
            info!(username = %seed.username, role = %seed.role, "seeded login user");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Stores;

    async fn gate() -> AuthGate {
        let stores = Stores::in_memory().await.unwrap();
        let gate = AuthGate::new(stores.users.clone(), &AuthConfig::default());
        gate.seed(&SeedUser {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            role: "admin".to_string(),
        })
        .await
        .unwrap();
        gate
    }

    #[tokio::test]
    async fn test_login_success_shape() {
        let gate = gate().await;

        let response = gate
            .login(&LoginRequest {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .await
            .unwrap();

        assert!(response.status);
        assert_eq!(response.token, "dummy-token-secret-123");
        assert_eq!(response.role, "admin");
        assert_eq!(response.username, "admin");
    }

    #[tokio::test]
    async fn test_login_mismatch_rejected() {
        let gate = gate().await;

        let err = gate
            .login(&LoginRequest {
                username: "admin".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_seed_twice_is_harmless() {
        let gate = gate().await;
        gate.seed(&SeedUser {
            username: "admin".to_string(),
            password: "changed".to_string(),
            role: "admin".to_string(),
        })
        .await
        .unwrap();

        // the original password still works
        assert!(gate
            .login(&LoginRequest {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .await
            .is_ok());
    }
}
