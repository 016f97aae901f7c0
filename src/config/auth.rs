//! Login configuration.

use serde::Deserialize;

/// Auth gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Static token handed out on successful login.
    pub token: String,
    /// User inserted at startup when no user with that name exists.
    pub seed_admin: Option<SeedUser>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: "dummy-token-secret-123".to_string(),
            seed_admin: None,
        }
    }
}

/// Credentials for a seeded user.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "admin".to_string()
}
