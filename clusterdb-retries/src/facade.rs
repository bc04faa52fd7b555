//! Collaborators consulted between attempts.
//!
//! The retry core reads retry policy from a [`Cluster`] and write-retry
//! capability from a [`Session`]. It owns neither; the only actions it
//! triggers are [`Cluster::scan`] and [`Session::next_txn_num`].

use clusterdb_core::{Result, RetrySettings, TxnNumber};
use std::sync::Arc;
use std::time::Duration;

/// The client's view of the server topology.
#[cfg_attr(test, mockall::automock)]
pub trait Cluster: Send + Sync {
    /// Maximum number of times a read may be retried.
    fn max_read_retries(&self) -> u32;

    /// Wait before retrying a read after a server error on a sharded cluster.
    fn read_retry_interval(&self) -> Duration;

    /// Whether the client talks to a shard router.
    fn is_sharded(&self) -> bool;

    /// Refresh the cached topology before the next attempt.
    ///
    /// A failure here aborts the retry sequence.
    fn scan(&self) -> Result<()>;
}

/// A logical session with the server.
#[cfg_attr(test, mockall::automock)]
pub trait Session: Send + Sync {
    /// Whether retryable writes were negotiated for this session.
    fn retry_writes(&self) -> bool;

    /// Whether a multi-statement transaction is in progress.
    fn in_transaction(&self) -> bool;

    /// Produce the next write-attempt identifier.
    fn next_txn_num(&self) -> Result<TxnNumber>;
}

impl<T: Cluster + ?Sized> Cluster for &T {
    fn max_read_retries(&self) -> u32 {
        (**self).max_read_retries()
    }

    fn read_retry_interval(&self) -> Duration {
        (**self).read_retry_interval()
    }

    fn is_sharded(&self) -> bool {
        (**self).is_sharded()
    }

    fn scan(&self) -> Result<()> {
        (**self).scan()
    }
}

impl<T: Cluster + ?Sized> Cluster for Arc<T> {
    fn max_read_retries(&self) -> u32 {
        (**self).max_read_retries()
    }

    fn read_retry_interval(&self) -> Duration {
        (**self).read_retry_interval()
    }

    fn is_sharded(&self) -> bool {
        (**self).is_sharded()
    }

    fn scan(&self) -> Result<()> {
        (**self).scan()
    }
}

impl<T: Session + ?Sized> Session for Arc<T> {
    fn retry_writes(&self) -> bool {
        (**self).retry_writes()
    }

    fn in_transaction(&self) -> bool {
        (**self).in_transaction()
    }

    fn next_txn_num(&self) -> Result<TxnNumber> {
        (**self).next_txn_num()
    }
}

/// A [`Cluster`] whose policy comes from [`RetrySettings`].
///
/// Rescans are delegated to a closure supplied by the topology monitor.
pub struct SettingsCluster<F> {
    settings: RetrySettings,
    sharded: bool,
    rescan: F,
}

impl<F> std::fmt::Debug for SettingsCluster<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsCluster")
            .field("settings", &self.settings)
            .field("sharded", &self.sharded)
            .finish_non_exhaustive()
    }
}

impl<F> SettingsCluster<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    /// Create a cluster from settings and a rescan action.
    pub fn new(settings: RetrySettings, sharded: bool, rescan: F) -> Self {
        Self {
            settings,
            sharded,
            rescan,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }
}

impl<F> Cluster for SettingsCluster<F>
where
    F: Fn() -> Result<()> + Send + Sync,
{
    fn max_read_retries(&self) -> u32 {
        self.settings.max_read_retries
    }

    fn read_retry_interval(&self) -> Duration {
        self.settings.read_retry_interval
    }

    fn is_sharded(&self) -> bool {
        self.sharded
    }

    fn scan(&self) -> Result<()> {
        (self.rescan)()
    }
}
