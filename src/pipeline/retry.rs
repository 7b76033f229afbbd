//! Bounded retry with exponential backoff.
//!
//! The delay after failed attempt `n` is `initial * 2^(n-1)`, capped at `max`.
//! A zero initial backoff retries immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::CachingConfig;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_backoff: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

/// A successful value plus how many attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CachingConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &CachingConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            initial_backoff: Duration::from_millis(config.retry_initial_backoff_ms),
            max_backoff: Duration::from_millis(config.retry_max_backoff_ms),
        }
    }

    /// Retry immediately, without any delay.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds or attempts run out.
    ///
    /// Each failure that will be retried is logged as a warning with its
    /// attempt number. When every attempt fails the last error is returned
    /// inside [`AppError::RetriesExhausted`].
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<Attempted<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(error) if attempt >= max_attempts => {
                    return Err(AppError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(error),
                    });
                }
                Err(error) => {
                    let delay = self.backoff_for(attempt);
                    log::warn!(
                        "{} failed on attempt {}/{}: {}. Retrying in {:?}",
                        label,
                        attempt,
                        max_attempts,
                        error,
                        delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
