// Bounded retry for transitions that lose an optimistic-concurrency race

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::PublishingError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 50,
            max_delay_ms: 2_000,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// No waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter: false,
        }
    }

    /// Backoff before attempt `attempt + 1`, doubling from `base_delay_ms`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let capped = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);

        if self.jitter && capped > 0 {
            Duration::from_millis(rand::rng().random_range(capped / 2..=capped))
        } else {
            Duration::from_millis(capped)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConflictRetryHandler {
    config: RetryConfig,
}

impl ConflictRetryHandler {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error, or
    /// runs out of attempts. The closure receives the 1-based attempt number.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, PublishingError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, PublishingError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(PublishingError::ConcurrencyConflict { entity, .. }) if attempt >= max_attempts => {
                    warn!(entity = %entity, attempts = attempt, "Retry attempts exhausted");
                    return Err(PublishingError::ConcurrencyConflict {
                        entity,
                        attempts: attempt,
                    });
                }
                Err(err) if err.is_retryable() => {
                    let delay = self.config.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retryable failure, trying again"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnificRootId;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn conflict() -> PublishingError {
        PublishingError::ConcurrencyConflict {
            entity: UnificRootId::from_u128(1),
            attempts: 1,
        }
    }

    #[test]
    fn delay_doubles_and_caps() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 250,
            jitter: false,
        };
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(250));
    }

    #[test]
    fn jitter_stays_within_half_to_full_delay() {
        let config = RetryConfig {
            jitter: true,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
            max_attempts: 3,
        };
        for _ in 0..50 {
            let delay = config.delay_for(2).as_millis();
            assert!((100..=200).contains(&delay));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_conflicts() {
        let handler = ConflictRetryHandler::new(RetryConfig::default());
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = handler
            .execute(|attempt| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(conflict())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempts() {
        let handler = ConflictRetryHandler::new(RetryConfig::immediate(2));
        let result: Result<(), _> = handler.execute(|_| async { Err(conflict()) }).await;

        assert_eq!(
            result,
            Err(PublishingError::ConcurrencyConflict {
                entity: UnificRootId::from_u128(1),
                attempts: 2
            })
        );
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let handler = ConflictRetryHandler::new(RetryConfig::immediate(5));
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = handler
            .execute(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PublishingError::Persistence("offline".to_string())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
