//! Read retry executor.
//!
//! Reads are retried up to [`Cluster::max_read_retries`] times. A network
//! failure rescans the topology and retries at once; a transient server
//! error on a sharded cluster waits [`Cluster::read_retry_interval`] first.
//! Server errors on a non-sharded cluster are never retried here.

use crate::classifier::RetryDisposition;
use crate::facade::Cluster;
use crate::retryable::Retryable;
use clusterdb_core::Result;
use std::future::Future;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Remaining read retries for one logical read.
///
/// The cluster is asked for its limit at every failure, but the remaining
/// budget never grows past what was left before.
#[derive(Debug, Clone, Default)]
pub struct ReadRetryBudget {
    remaining: Option<u32>,
    used: u32,
}

impl ReadRetryBudget {
    /// Create an untouched budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to spend one retry given the limit the cluster reports now.
    ///
    /// Returns `false` when no retries are left.
    pub fn try_consume(&mut self, reported_max: u32) -> bool {
        let allowed = reported_max.saturating_sub(self.used);
        let left = self.remaining.map_or(allowed, |remaining| remaining.min(allowed));
        if left == 0 {
            self.remaining = Some(0);
            return false;
        }
        self.remaining = Some(left - 1);
        self.used += 1;
        true
    }

    /// Retries spent so far.
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Retries left after the last decision, if one was made.
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }
}

impl<C: Cluster> Retryable<C> {
    /// Execute a read, retrying topology failures.
    ///
    /// On success the result is returned with no call to the cluster. On
    /// exhaustion or a non-retryable failure the last error is returned
    /// unchanged.
    pub async fn read_with_retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut budget = ReadRetryBudget::new();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let error = match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };

            match self.classifier.classify(&error) {
                RetryDisposition::NetworkFailure => {
                    if !budget.try_consume(self.cluster.max_read_retries()) {
                        warn!(attempt, error = %error, "Read retries exhausted");
                        return Err(error);
                    }
                    debug!(
                        attempt,
                        retries_left = budget.remaining().unwrap_or(0),
                        error = %error,
                        "Rescanning topology before read retry"
                    );
                    self.cluster.scan()?;
                }
                disposition if disposition.is_operation_failure() => {
                    if !self.cluster.is_sharded() {
                        return Err(error);
                    }
                    if disposition == RetryDisposition::NonRetryableOperationFailure {
                        warn!(attempt, error = %error, "Read error not retryable");
                        return Err(error);
                    }
                    if !budget.try_consume(self.cluster.max_read_retries()) {
                        warn!(attempt, error = %error, "Read retries exhausted");
                        return Err(error);
                    }
                    let wait = self.cluster.read_retry_interval();
                    debug!(
                        attempt,
                        retries_left = budget.remaining().unwrap_or(0),
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Waiting before read retry"
                    );
                    sleep(wait).await;
                }
                _ => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::MockCluster;
    use crate::test_support::EventRecorder;
    use clusterdb_core::{Error, OperationFailure};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    fn failing_then_ok(
        failures: u32,
        make_error: fn() -> Error,
    ) -> (Arc<AtomicU32>, impl Fn() -> std::future::Ready<Result<u32>>) {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let op = move || {
            let n = calls_clone.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if n < failures {
                Err(make_error())
            } else {
                Ok(n + 1)
            })
        };
        (calls, op)
    }

    fn not_master() -> Error {
        Error::operation("not master")
    }

    #[test]
    fn test_budget_counts_down() {
        let mut budget = ReadRetryBudget::new();
        assert!(budget.try_consume(2));
        assert_eq!(budget.remaining(), Some(1));
        assert!(budget.try_consume(2));
        assert!(!budget.try_consume(2));
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn test_budget_never_grows() {
        let mut budget = ReadRetryBudget::new();
        assert!(budget.try_consume(2));
        // The cluster raising its limit mid-sequence does not add retries.
        assert!(budget.try_consume(10));
        assert!(!budget.try_consume(10));
    }

    #[test]
    fn test_budget_shrinks_when_cluster_lowers_limit() {
        let mut budget = ReadRetryBudget::new();
        assert!(budget.try_consume(5));
        assert!(!budget.try_consume(1));
        assert_eq!(budget.remaining(), Some(0));
    }

    #[test]
    fn test_zero_budget() {
        let mut budget = ReadRetryBudget::new();
        assert!(!budget.try_consume(0));
        assert_eq!(budget.used(), 0);
    }

    #[tokio::test]
    async fn test_success_touches_no_collaborator() {
        let retryable = Retryable::new(MockCluster::new());
        let (calls, op) = failing_then_ok(0, not_master);

        let result = retryable.read_with_retry(op).await;

        assert_eq!(assert_ok!(result), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_network_failure_retried_until_exhausted() {
        let mut cluster = MockCluster::new();
        cluster.expect_max_read_retries().return_const(3u32);
        cluster.expect_scan().times(3).returning(|| Ok(()));
        cluster.expect_read_retry_interval().never();
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(u32::MAX, || Error::socket("connection reset"));

        let err = assert_err!(retryable.read_with_retry(op).await);

        assert!(err.is_network());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_network_failure_then_success() {
        let mut cluster = MockCluster::new();
        cluster.expect_max_read_retries().return_const(1u32);
        cluster.expect_scan().times(1).returning(|| Ok(()));
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(1, || Error::socket_timeout("timed out"));

        let result = retryable.read_with_retry(op).await;

        assert_eq!(assert_ok!(result), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_network_failure_without_budget() {
        let mut cluster = MockCluster::new();
        cluster.expect_max_read_retries().return_const(0u32);
        cluster.expect_scan().never();
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(1, || Error::socket("reset"));

        assert_err!(retryable.read_with_retry(op).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_does_not_sleep() {
        let mut cluster = MockCluster::new();
        cluster.expect_max_read_retries().return_const(2u32);
        cluster.expect_scan().returning(|| Ok(()));
        cluster.expect_read_retry_interval().never();
        let retryable = Retryable::new(cluster);
        let (_, op) = failing_then_ok(2, || Error::socket("reset"));

        let start = Instant::now();
        assert_ok!(retryable.read_with_retry(op).await);
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_scan_failure_aborts() {
        let mut cluster = MockCluster::new();
        cluster.expect_max_read_retries().return_const(5u32);
        cluster
            .expect_scan()
            .times(1)
            .returning(|| Err(Error::Configuration("monitor stopped".into())));
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(u32::MAX, || Error::socket("reset"));

        let err = assert_err!(retryable.read_with_retry(op).await);

        assert!(matches!(err, Error::Configuration(ref m) if m == "monitor stopped"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sharded_operation_failure_waits_interval() {
        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().return_const(true);
        cluster.expect_max_read_retries().return_const(2u32);
        cluster
            .expect_read_retry_interval()
            .times(2)
            .return_const(Duration::from_millis(300));
        cluster.expect_scan().never();
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(2, not_master);

        let start = Instant::now();
        let result = retryable.read_with_retry(op).await;

        assert_eq!(assert_ok!(result), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(600));
        assert!(start.elapsed() < Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_logged_saturated() {
        let recorder = EventRecorder::default();
        let _guard = tracing::subscriber::set_default(recorder.clone());
        let huge = Duration::from_secs(u64::MAX / 1000 + 1);
        assert!(huge.as_millis() > u128::from(u64::MAX));

        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().return_const(true);
        cluster.expect_max_read_retries().return_const(1u32);
        cluster.expect_read_retry_interval().times(1).return_const(huge);
        let retryable = Retryable::new(cluster);
        let (_, op) = failing_then_ok(1, not_master);

        assert_eq!(assert_ok!(retryable.read_with_retry(op).await), 2);

        let waiting = recorder.find("Waiting before read retry").unwrap();
        assert_eq!(
            waiting.fields.get("wait_ms").map(String::as_str),
            Some(u64::MAX.to_string().as_str())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sharded_interval_is_read_before_each_retry() {
        let intervals = Arc::new(AtomicU32::new(0));
        let intervals_clone = intervals.clone();
        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().return_const(true);
        cluster.expect_max_read_retries().return_const(2u32);
        cluster.expect_read_retry_interval().returning(move || {
            let n = intervals_clone.fetch_add(1, Ordering::SeqCst);
            Duration::from_millis(100 * u64::from(n + 1))
        });
        let retryable = Retryable::new(cluster);
        let (_, op) = failing_then_ok(2, || {
            Error::Operation(OperationFailure::new("shutting down").with_code(91))
        });

        let start = Instant::now();
        assert_ok!(retryable.read_with_retry(op).await);

        assert_eq!(intervals.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_sharded_operation_failure_exhausted() {
        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().return_const(true);
        cluster.expect_max_read_retries().return_const(1u32);
        cluster
            .expect_read_retry_interval()
            .return_const(Duration::ZERO);
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(u32::MAX, || Error::operation("node is recovering"));

        let err = assert_err!(retryable.read_with_retry(op).await);

        assert_eq!(
            err.as_operation_failure().map(|f| f.message.as_str()),
            Some("node is recovering")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_sharded_operation_failure_not_retried() {
        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().return_const(false);
        cluster.expect_max_read_retries().never();
        cluster.expect_read_retry_interval().never();
        cluster.expect_scan().never();
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(1, not_master);

        assert_err!(retryable.read_with_retry(op).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sharded_non_retryable_operation_failure() {
        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().return_const(true);
        cluster.expect_max_read_retries().never();
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(1, || {
            Error::Operation(OperationFailure::new("not authorized").with_code(13))
        });

        assert_err!(retryable.read_with_retry(op).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsupported_feature_not_retried() {
        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().never();
        cluster.expect_max_read_retries().never();
        let retryable = Retryable::new(cluster);
        let (calls, op) = failing_then_ok(1, || Error::unsupported("collation"));

        let err = assert_err!(retryable.read_with_retry(op).await);

        assert!(matches!(err, Error::UnsupportedFeature(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mixed_failures_share_one_budget() {
        let mut cluster = MockCluster::new();
        cluster.expect_is_sharded().return_const(true);
        cluster.expect_max_read_retries().return_const(2u32);
        cluster
            .expect_read_retry_interval()
            .return_const(Duration::ZERO);
        cluster.expect_scan().times(1).returning(|| Ok(()));
        let retryable = Retryable::new(cluster);

        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = retryable
            .read_with_retry(|| {
                let n = calls_clone.fetch_add(1, Ordering::SeqCst);
                async move {
                    match n {
                        0 => Err(Error::socket("reset")),
                        _ => Err::<(), _>(not_master()),
                    }
                }
            })
            .await;

        assert_err!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
