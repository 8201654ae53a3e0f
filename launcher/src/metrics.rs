//! Launcher metrics.
//!
//! Provides atomic counters for monitoring launch operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics for the launcher.
#[derive(Debug)]
pub struct LaunchMetrics {
    /// Transactions sent to the cluster.
    transactions_submitted: AtomicU64,

    /// Transactions that reached the requested commitment.
    transactions_confirmed: AtomicU64,

    /// Transactions that failed to send or confirm.
    transactions_failed: AtomicU64,

    /// Markets fully created.
    markets_created: AtomicU64,

    /// Tokens fully created.
    tokens_created: AtomicU64,

    /// Lamports spent on rent and platform fees by completed flows.
    lamports_committed: AtomicU64,

    /// Start time for uptime.
    start_time: Instant,
}

impl Default for LaunchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transactions_submitted: AtomicU64::new(0),
            transactions_confirmed: AtomicU64::new(0),
            transactions_failed: AtomicU64::new(0),
            markets_created: AtomicU64::new(0),
            tokens_created: AtomicU64::new(0),
            lamports_committed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a transaction submission.
    pub fn record_submission(&self) {
        self.transactions_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a confirmed transaction.
    pub fn record_confirmed(&self) {
        self.transactions_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed transaction.
    pub fn record_failure(&self) {
        self.transactions_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed market creation and the lamports it locked.
    pub fn record_market(&self, lamports: u64) {
        self.markets_created.fetch_add(1, Ordering::Relaxed);
        self.lamports_committed.fetch_add(lamports, Ordering::Relaxed);
    }

    /// Records a completed token creation and the lamports it locked.
    pub fn record_token(&self, lamports: u64) {
        self.tokens_created.fetch_add(1, Ordering::Relaxed);
        self.lamports_committed.fetch_add(lamports, Ordering::Relaxed);
    }

    /// Returns transactions submitted.
    #[must_use]
    pub fn transactions_submitted(&self) -> u64 {
        self.transactions_submitted.load(Ordering::Relaxed)
    }

    /// Returns confirmed transactions.
    #[must_use]
    pub fn transactions_confirmed(&self) -> u64 {
        self.transactions_confirmed.load(Ordering::Relaxed)
    }

    /// Returns failed transactions.
    #[must_use]
    pub fn transactions_failed(&self) -> u64 {
        self.transactions_failed.load(Ordering::Relaxed)
    }

    /// Returns markets created.
    #[must_use]
    pub fn markets_created(&self) -> u64 {
        self.markets_created.load(Ordering::Relaxed)
    }

    /// Returns tokens created.
    #[must_use]
    pub fn tokens_created(&self) -> u64 {
        self.tokens_created.load(Ordering::Relaxed)
    }

    /// Returns lamports committed.
    #[must_use]
    pub fn lamports_committed(&self) -> u64 {
        self.lamports_committed.load(Ordering::Relaxed)
    }

    /// Returns the uptime.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the confirmation rate (0.0 to 1.0).
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let submitted = self.transactions_submitted();
        if submitted > 0 {
            self.transactions_confirmed() as f64 / submitted as f64
        } else {
            0.0
        }
    }

    /// Returns a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> LaunchMetricsSnapshot {
        LaunchMetricsSnapshot {
            transactions_submitted: self.transactions_submitted(),
            transactions_confirmed: self.transactions_confirmed(),
            transactions_failed: self.transactions_failed(),
            markets_created: self.markets_created(),
            tokens_created: self.tokens_created(),
            lamports_committed: self.lamports_committed(),
            uptime: self.uptime(),
            success_rate: self.success_rate(),
        }
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.transactions_submitted.store(0, Ordering::Relaxed);
        self.transactions_confirmed.store(0, Ordering::Relaxed);
        self.transactions_failed.store(0, Ordering::Relaxed);
        self.markets_created.store(0, Ordering::Relaxed);
        self.tokens_created.store(0, Ordering::Relaxed);
        self.lamports_committed.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of launcher metrics.
#[derive(Debug, Clone)]
pub struct LaunchMetricsSnapshot {
    /// Transactions submitted.
    pub transactions_submitted: u64,
    /// Confirmed transactions.
    pub transactions_confirmed: u64,
    /// Failed transactions.
    pub transactions_failed: u64,
    /// Markets created.
    pub markets_created: u64,
    /// Tokens created.
    pub tokens_created: u64,
    /// Lamports committed.
    pub lamports_committed: u64,
    /// Uptime.
    pub uptime: Duration,
    /// Confirmation rate.
    pub success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LaunchMetrics::new();
        assert_eq!(metrics.transactions_submitted(), 0);
        assert_eq!(metrics.markets_created(), 0);
    }

    #[test]
    fn test_metrics_record_transactions() {
        let metrics = LaunchMetrics::default();

        metrics.record_submission();
        metrics.record_confirmed();
        metrics.record_submission();
        metrics.record_failure();

        assert_eq!(metrics.transactions_submitted(), 2);
        assert_eq!(metrics.transactions_confirmed(), 1);
        assert_eq!(metrics.transactions_failed(), 1);
        assert!((metrics.success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_success_rate_empty() {
        assert_eq!(LaunchMetrics::new().success_rate(), 0.0);
    }

    #[test]
    fn test_metrics_record_flows() {
        let metrics = LaunchMetrics::new();

        metrics.record_market(3_000_000_000);
        metrics.record_token(10_000_000);

        assert_eq!(metrics.markets_created(), 1);
        assert_eq!(metrics.tokens_created(), 1);
        assert_eq!(metrics.lamports_committed(), 3_010_000_000);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = LaunchMetrics::new();

        metrics.record_submission();
        metrics.record_confirmed();
        metrics.record_market(42);

        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.transactions_submitted, 1);
        assert_eq!(snapshot.transactions_confirmed, 1);
        assert_eq!(snapshot.markets_created, 1);
        assert_eq!(snapshot.lamports_committed, 42);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LaunchMetrics::new();

        metrics.record_submission();
        metrics.record_token(100);

        metrics.reset();

        assert_eq!(metrics.transactions_submitted(), 0);
        assert_eq!(metrics.tokens_created(), 0);
        assert_eq!(metrics.lamports_committed(), 0);
    }
}
