//! # clusterdb - Retry core for replicated and sharded database clusters
//!
//! clusterdb decides, for a single logical read or write, whether a failure
//! was caused by a topology change (primary failover, a shard router's
//! transient error, a network blip) and how to retry it safely.
//!
//! ## Quick Start
//!
//! ```ignore
//! use clusterdb::prelude::*;
//!
//! let cluster = SettingsCluster::new(RetrySettings::new(), false, || monitor.scan());
//! let retryable = Retryable::new(cluster);
//!
//! let doc = retryable.read_with_retry(|| async { connection.find_one(&filter).await }).await?;
//! ```
//!
//! ## Retry Protocols
//!
//! - **Reads** are retried up to `max_read_retries` times. Network failures
//!   rescan the topology and retry immediately; failover errors on a sharded
//!   cluster wait `read_retry_interval` first.
//! - **Legacy writes** (no retryable-writes session) retry a recognized
//!   failover error once. Network failures are never retried.
//! - **Modern writes** (session with retryable writes, outside a
//!   transaction, acknowledged write concern) retry network and failover
//!   errors once, tagged with the same transaction number.
//!
//! ## Architecture
//!
//! - [`clusterdb_core`] - Errors, settings, write concern, transaction numbers
//! - [`clusterdb_retries`] - Classifier, executors, and authorization gate

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use clusterdb_core;
pub use clusterdb_retries;

pub use clusterdb_core::{
    Acknowledgment, Error, NetworkError, NetworkErrorKind, OperationFailure, Result,
    RetrySettings, TxnNumber, TxnNumberSequence, UnsupportedFeature, WriteConcern,
};
pub use clusterdb_retries::{
    retry_write_allowed, Cluster, ErrorClassifier, ReadRetryBudget, RetryDisposition, Retryable,
    Session, SettingsCluster, WriteRetryMode,
};

/// Prelude for common imports.
///
/// ```rust
/// use clusterdb::prelude::*;
/// ```
pub mod prelude {
    pub use clusterdb_core::prelude::*;
    pub use clusterdb_retries::prelude::*;
}
