//! Retry utilities: backoff builders.
//!
//! Uses `backon` for exponential backoff with jitter.

use std::time::Duration;

use backon::ExponentialBuilder;

/// Backoff for checkout retries after an order code collision.
///
/// `attempts` counts every try including the first, so the builder allows
/// `attempts - 1` retries.
///
/// - Min delay: 5ms
/// - Max delay: 100ms
/// - Jitter enabled
pub fn order_code_backoff(attempts: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(100))
        .with_max_times(attempts.saturating_sub(1))
        .with_jitter()
}
