//! Order engine configuration.

use std::time::Duration;

use serde::Deserialize;

/// Checkout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Literal prefix of generated order codes.
    pub code_prefix: String,
    /// Total checkout attempts when a generated order code collides.
    pub max_code_attempts: usize,
    /// Upper bound on a single checkout's atomic unit, in milliseconds.
    pub transaction_timeout_ms: u64,
}

impl OrdersConfig {
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            code_prefix: "B3".to_string(),
            max_code_attempts: 2,
            transaction_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_config_default() {
        let config = OrdersConfig::default();
        assert_eq!(config.max_code_attempts, 2);
        assert_eq!(config.transaction_timeout(), Duration::from_secs(5));
    }
}
