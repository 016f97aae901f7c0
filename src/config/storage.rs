//! Storage configuration types.

use serde::Deserialize;

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path. `:memory:` opens a private in-memory database.
    pub path: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_secs: u64,
}

impl StorageConfig {
    /// True when the configured path is SQLite's in-memory sentinel.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "data/bookstore.db".to_string(),
            max_connections: 5,
            busy_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_default() {
        let storage = StorageConfig::default();
        assert_eq!(storage.path, "data/bookstore.db");
        assert_eq!(storage.busy_timeout_secs, 30);
        assert!(!storage.is_in_memory());
    }
}
