//! Entry point for running operations with retries.

use crate::classifier::ErrorClassifier;
use crate::facade::Cluster;

/// Runs reads and writes against a cluster, retrying topology failures.
///
/// `Retryable` holds no per-call state, so one instance can serve any
/// number of concurrent operations.
///
/// # Example
///
/// ```ignore
/// use clusterdb_retries::Retryable;
///
/// let retryable = Retryable::new(cluster);
/// let doc = retryable.read_with_retry(|| async {
///     // Send the find command
///     Ok(find_one().await?)
/// }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Retryable<C> {
    pub(crate) cluster: C,
    pub(crate) classifier: ErrorClassifier,
}

impl<C: Cluster> Retryable<C> {
    /// Create with the default error classifier.
    pub fn new(cluster: C) -> Self {
        Self {
            cluster,
            classifier: ErrorClassifier::default(),
        }
    }

    /// Replace the error classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Get a reference to the cluster.
    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Get a reference to the error classifier.
    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }
}
