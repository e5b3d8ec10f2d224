//! crates/trip_scout_core/src/retry.rs

use std::ops::RangeInclusive;
use std::time::Duration;

/// Fixed-count, fixed-delay retry for scouts that came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// The initial run plus every retry.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Retry round numbers, starting at 1. Empty when retries are disabled.
    pub fn retry_rounds(&self) -> RangeInclusive<u32> {
        1..=self.max_retries
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allows_three_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.total_attempts(), 3);
        assert_eq!(policy.retry_rounds().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.total_attempts(), 1);
        assert_eq!(policy.retry_rounds().count(), 0);
    }
}
