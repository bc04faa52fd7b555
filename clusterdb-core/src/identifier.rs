//! Write-attempt identifiers.
//!
//! A [`TxnNumber`] tags a write so the server can recognize a retry of the
//! same logical write and apply it only once.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Session-scoped, monotonically increasing write-attempt identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnNumber(i64);

impl TxnNumber {
    /// Wrap a raw value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw value sent to the server.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TxnNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TxnNumber> for i64 {
    fn from(n: TxnNumber) -> Self {
        n.0
    }
}

/// Generator of strictly increasing [`TxnNumber`]s for one session.
///
/// The first number handed out is `1`. The sequence ends at `i64::MAX`;
/// asking for a number past it fails instead of wrapping.
#[derive(Debug, Default)]
pub struct TxnNumberSequence {
    last: AtomicI64,
}

impl TxnNumberSequence {
    /// Create a sequence starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequence that continues after `last`.
    #[must_use]
    pub fn starting_after(last: TxnNumber) -> Self {
        Self {
            last: AtomicI64::new(last.get()),
        }
    }

    /// Produce the next number.
    pub fn next(&self) -> Result<TxnNumber> {
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map(|last| TxnNumber(last + 1))
            .map_err(|last| Error::Internal(format!("txn number sequence exhausted at {}", last)))
    }

    /// The last number produced, if any.
    #[must_use]
    pub fn current(&self) -> Option<TxnNumber> {
        match self.last.load(Ordering::SeqCst) {
            0 => None,
            n => Some(TxnNumber(n)),
        }
    }
}
