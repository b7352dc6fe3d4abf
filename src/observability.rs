use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Transition outcome counters
#[derive(Debug, Default)]
pub struct PublishingMetrics {
    pub requested: AtomicU64,
    pub succeeded: AtomicU64,
    pub failed: AtomicU64,
    pub retried: AtomicU64,
    pub validation_failures: AtomicU64,
    pub planned: AtomicU64,
}

impl PublishingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retried.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_plan(&self) {
        self.planned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> PublishingStats {
        PublishingStats {
            requested: self.requested.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            planned: self.planned.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            requested = stats.requested,
            succeeded = stats.succeeded,
            failed = stats.failed,
            retried = stats.retried,
            validation_failures = stats.validation_failures,
            planned = stats.planned,
            "Publishing metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublishingStats {
    pub requested: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub retried: u64,
    pub validation_failures: u64,
    pub planned: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = PublishingMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_success();
        metrics.record_retry();

        let stats = metrics.get_stats();
        assert_eq!(stats.requested, 2);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.retried, 1);
        assert_eq!(stats.failed, 0);
    }
}
