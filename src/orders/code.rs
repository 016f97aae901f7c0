//! Order code generation.
//!
//! Codes look like `B3-20260301-4821`: a configured prefix, the UTC date of
//! generation, and a random four-digit suffix. Uniqueness is not guaranteed
//! here; the storage layer rejects duplicates and the engine retries.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Lowest random suffix.
pub const SUFFIX_MIN: u16 = 1000;
/// Highest random suffix.
pub const SUFFIX_MAX: u16 = 9999;

/// Source of candidate order codes.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> String;
}

/// Generates `{prefix}-{YYYYMMDD}-{NNNN}` codes with a uniform random suffix.
#[derive(Debug, Clone)]
pub struct OrderCodeGenerator {
    prefix: String,
}

impl OrderCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Format a code for a given instant and suffix.
    pub fn generate_at(&self, at: DateTime<Utc>, suffix: u16) -> String {
        format!("{}-{}-{:04}", self.prefix, at.format("%Y%m%d"), suffix)
    }
}

impl CodeSource for OrderCodeGenerator {
    fn next_code(&self) -> String {
        let suffix = rand::rng().random_range(SUFFIX_MIN..=SUFFIX_MAX);
        self.generate_at(Utc::now(), suffix)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_generate_at_format() {
        let generator = OrderCodeGenerator::new("B3");
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 59).unwrap();
        assert_eq!(generator.generate_at(at, 4821), "B3-20260301-4821");
    }

    #[test]
    fn test_next_code_shape() {
        let generator = OrderCodeGenerator::new("B3");
        let today = Utc::now().format("%Y%m%d").to_string();

        for _ in 0..200 {
            let code = generator.next_code();
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "unexpected code {code}");
            assert_eq!(parts[0], "B3");
            // allow for a date rollover between the two clock reads
            assert!(parts[1] == today || parts[1] > today.as_str());
            assert_eq!(parts[1].len(), 8);

            let suffix: u16 = parts[2].parse().unwrap();
            assert!((SUFFIX_MIN..=SUFFIX_MAX).contains(&suffix));
        }
    }

    #[test]
    fn test_custom_prefix() {
        let generator = OrderCodeGenerator::new("BK");
        assert!(generator.next_code().starts_with("BK-"));
    }
}
