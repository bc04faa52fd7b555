//! Client retry settings.
//!
//! This module provides the `RetrySettings` type holding the retry policy
//! parameters a cluster reports to the retry core.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of read retries.
pub const DEFAULT_MAX_READ_RETRIES: u32 = 1;

/// Default wait before retrying a read against a sharded cluster.
pub const DEFAULT_READ_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Retry policy parameters for a client.
///
/// Durations are (de)serialized as floating point seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of times a read is retried.
    pub max_read_retries: u32,

    /// Wait before retrying a read that failed on a sharded cluster.
    #[serde(with = "duration_secs_serde")]
    pub read_retry_interval: Duration,

    /// Whether sessions should negotiate retryable writes.
    pub retry_writes: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_read_retries: DEFAULT_MAX_READ_RETRIES,
            read_retry_interval: DEFAULT_READ_RETRY_INTERVAL,
            retry_writes: true,
        }
    }
}

impl RetrySettings {
    /// Create default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Set max read retries.
    #[must_use]
    pub fn max_read_retries(mut self, retries: u32) -> Self {
        self.max_read_retries = retries;
        self
    }

    /// Set the read retry interval.
    #[must_use]
    pub fn read_retry_interval(mut self, interval: Duration) -> Self {
        self.read_retry_interval = interval;
        self
    }

    /// Set the read retry interval in milliseconds.
    #[must_use]
    pub fn read_retry_interval_ms(self, millis: u64) -> Self {
        self.read_retry_interval(Duration::from_millis(millis))
    }

    /// Set whether retryable writes are requested.
    #[must_use]
    pub fn retry_writes(mut self, enabled: bool) -> Self {
        self.retry_writes = enabled;
        self
    }

    /// Settings that never retry reads and never request retryable writes.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new().max_read_retries(0).retry_writes(false)
    }
}

mod duration_secs_serde {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}
