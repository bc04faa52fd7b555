//! # clusterdb-retries
//!
//! Retry decisions for operations against a replicated or sharded cluster.
//!
//! This crate decides, for a single logical read or write, whether a failure
//! was caused by a topology change and can be retried, how often, and with
//! which protocol.
//!
//! ## Core Concepts
//!
//! - **[`Retryable`]**: Entry point holding the cluster and error classifier
//! - **[`ErrorClassifier`]**: Maps a failure to a [`RetryDisposition`]
//! - **[`Cluster`]** / **[`Session`]**: Collaborators consulted between attempts
//! - **[`retry_write_allowed`]**: Picks the legacy or the modern write path
//!
//! ## Retry Paths
//!
//! | Path | Network failure | Failover error | Attempts |
//! |------|-----------------|----------------|----------|
//! | Read | rescan, no wait | wait interval (sharded only) | `max_read_retries + 1` |
//! | Legacy write | not retried | rescan | 2 |
//! | Modern write | rescan | rescan | 2 |
//!
//! Network errors reported by the server (a socket exception between cluster
//! members, say) count as transient for reads and modern writes, but not for
//! legacy writes: the command may already have been applied.
//!
//! ## Example
//!
//! ```ignore
//! use clusterdb_retries::{Retryable, SettingsCluster};
//! use clusterdb_core::RetrySettings;
//!
//! let cluster = SettingsCluster::new(RetrySettings::new(), true, || topology.scan());
//! let retryable = Retryable::new(cluster);
//!
//! let docs = retryable.read_with_retry(|| async {
//!     // Your find command
//!     connection.find(&filter).await
//! }).await?;
//!
//! let result = retryable
//!     .write_with_retry(Some(&session), Some(&write_concern), |txn_number| async move {
//!         connection.insert(&doc, txn_number).await
//!     })
//!     .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod classifier;
pub mod facade;
pub mod gate;
pub mod read;
pub mod retryable;
pub mod write;

#[cfg(test)]
mod test_support;

// Re-exports
pub use classifier::{
    ErrorClassifier, RetryDisposition, DEFAULT_FAILOVER_MESSAGES, DEFAULT_RETRY_MESSAGES,
};
pub use facade::{Cluster, Session, SettingsCluster};
pub use gate::{retry_write_allowed, WriteRetryMode};
pub use read::ReadRetryBudget;
pub use retryable::Retryable;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        retry_write_allowed, Cluster, ErrorClassifier, RetryDisposition, Retryable, Session,
        SettingsCluster, WriteRetryMode,
    };
}
