//! Error classification.
//!
//! Maps a failure to a [`RetryDisposition`]. The message and code tables
//! live here and nowhere else, so they can be extended or replaced without
//! touching the executors.
//!
//! Two tables are kept. The failover table holds server errors proving a
//! primary stepped down before applying the command. The transient table
//! adds network-level errors reported by the server, which may hide a
//! command that was applied; only paths that can deduplicate a retry, or
//! that only read, may trust it.

use clusterdb_core::codes;
use clusterdb_core::{Error, OperationFailure};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Message fragments that confirm a primary failover.
pub const DEFAULT_FAILOVER_MESSAGES: &[&str] = &[
    "not master",
    "node is recovering",
    "no master",
    "not primary",
    "could not contact primary",
];

/// Message fragments that signal a transient topology change, failover
/// included.
pub const DEFAULT_RETRY_MESSAGES: &[&str] = &[
    "not master",
    "node is recovering",
    "no master",
    "not primary",
    "could not contact primary",
    "transport error",
    "socket exception",
    "can't connect",
    "connect failed",
    "error querying",
    "could not get last error",
    "connection attempt failed",
    "interrupted at shutdown",
    "unknown replica set",
    "dbclient error communicating with server",
];

/// How a failure should be treated by the retry executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryDisposition {
    /// Socket error or socket timeout.
    NetworkFailure,
    /// Server error signalling a transient topology change.
    RetryableOperationFailure,
    /// Any other server error.
    NonRetryableOperationFailure,
    /// Anything that is neither a network nor a server failure.
    NonRetryableOther,
}

impl RetryDisposition {
    /// Whether the failure came from the server.
    pub fn is_operation_failure(self) -> bool {
        matches!(
            self,
            Self::RetryableOperationFailure | Self::NonRetryableOperationFailure
        )
    }
}

/// Classifies failures using tables of message fragments and error codes.
///
/// Message matching is case-insensitive substring matching. Fragments are
/// stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorClassifier {
    #[serde(deserialize_with = "lowercase_fragments")]
    messages: Vec<String>,
    codes: BTreeSet<i32>,
    #[serde(deserialize_with = "lowercase_fragments")]
    failover_messages: Vec<String>,
    failover_codes: BTreeSet<i32>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            messages: lowercase_all(DEFAULT_RETRY_MESSAGES),
            codes: codes::TRANSIENT_TOPOLOGY_CODES.iter().copied().collect(),
            failover_messages: lowercase_all(DEFAULT_FAILOVER_MESSAGES),
            failover_codes: codes::FAILOVER_CODES.iter().copied().collect(),
        }
    }
}

impl ErrorClassifier {
    /// Create a classifier with the default tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier that treats no server error as retryable.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            codes: BTreeSet::new(),
            failover_messages: Vec::new(),
            failover_codes: BTreeSet::new(),
        }
    }

    /// Add a transient message fragment.
    #[must_use]
    pub fn on_message(mut self, fragment: impl Into<String>) -> Self {
        self.messages.push(fragment.into().to_lowercase());
        self
    }

    /// Add transient error codes.
    #[must_use]
    pub fn on_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.codes.extend(codes);
        self
    }

    /// Add a failover message fragment. Failover errors are also transient.
    #[must_use]
    pub fn on_failover_message(mut self, fragment: impl Into<String>) -> Self {
        self.failover_messages.push(fragment.into().to_lowercase());
        self
    }

    /// Add failover error codes. Failover errors are also transient.
    #[must_use]
    pub fn on_failover_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.failover_codes.extend(codes);
        self
    }

    /// Transient message fragments, lowercase.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Transient error codes.
    pub fn codes(&self) -> &BTreeSet<i32> {
        &self.codes
    }

    /// Failover message fragments, lowercase.
    pub fn failover_messages(&self) -> &[String] {
        &self.failover_messages
    }

    /// Failover error codes.
    pub fn failover_codes(&self) -> &BTreeSet<i32> {
        &self.failover_codes
    }

    /// Classify a failure for reads and retryable writes.
    ///
    /// Server errors matching either table are retryable.
    pub fn classify(&self, error: &Error) -> RetryDisposition {
        self.classify_with(error, |failure| self.is_retryable(failure))
    }

    /// Classify a failure for a write without a retryable-writes session.
    ///
    /// Only server errors matching the failover table are retryable.
    pub fn classify_for_legacy_write(&self, error: &Error) -> RetryDisposition {
        self.classify_with(error, |failure| self.is_failover(failure))
    }

    /// Check a server error against both tables.
    pub fn is_retryable(&self, failure: &OperationFailure) -> bool {
        self.is_failover(failure) || matches_table(failure, &self.messages, &self.codes)
    }

    /// Check a server error against the failover table.
    pub fn is_failover(&self, failure: &OperationFailure) -> bool {
        matches_table(failure, &self.failover_messages, &self.failover_codes)
    }

    fn classify_with(
        &self,
        error: &Error,
        retryable: impl Fn(&OperationFailure) -> bool,
    ) -> RetryDisposition {
        match error {
            Error::Network(_) => RetryDisposition::NetworkFailure,
            Error::Operation(failure) if retryable(failure) => {
                RetryDisposition::RetryableOperationFailure
            }
            Error::Operation(_) => RetryDisposition::NonRetryableOperationFailure,
            Error::UnsupportedFeature(_)
            | Error::Configuration(_)
            | Error::Internal(_)
            | Error::Other(_) => RetryDisposition::NonRetryableOther,
        }
    }
}

fn matches_table(failure: &OperationFailure, messages: &[String], codes: &BTreeSet<i32>) -> bool {
    if failure.code.is_some_and(|code| codes.contains(&code)) {
        return true;
    }
    if messages.is_empty() {
        return false;
    }

    let message = failure.message.to_lowercase();
    messages.iter().any(|fragment| message.contains(fragment.as_str()))
}

fn lowercase_all(fragments: &[&str]) -> Vec<String> {
    fragments.iter().map(|f| f.to_lowercase()).collect()
}

fn lowercase_fragments<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let fragments = Vec::<String>::deserialize(deserializer)?;
    Ok(fragments.into_iter().map(|f| f.to_lowercase()).collect())
}
