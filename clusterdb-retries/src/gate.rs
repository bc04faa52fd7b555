//! Retry authorization for writes.
//!
//! Decides whether a write may use the session-backed retryable-writes
//! protocol or must fall back to the legacy best-effort retry.

use crate::facade::Session;
use clusterdb_core::WriteConcern;

/// Whether a write may be retried with the retryable-writes protocol.
///
/// True only when a session is present, it negotiated retryable writes, it
/// is not inside a transaction, and the write concern is absent or
/// acknowledged.
pub fn retry_write_allowed(
    session: Option<&dyn Session>,
    write_concern: Option<&WriteConcern>,
) -> bool {
    let Some(session) = session else {
        return false;
    };
    session.retry_writes()
        && !session.in_transaction()
        && write_concern.map_or(true, WriteConcern::is_acknowledged)
}

/// Which write executor handles a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteRetryMode {
    /// Single retry after a recognized failover error, no deduplication.
    Legacy,
    /// Single retry of both network and failover errors, deduplicated by
    /// the session's transaction number.
    Modern,
}

impl WriteRetryMode {
    /// Pick the executor for the given session and write concern.
    pub fn select(session: Option<&dyn Session>, write_concern: Option<&WriteConcern>) -> Self {
        if retry_write_allowed(session, write_concern) {
            Self::Modern
        } else {
            Self::Legacy
        }
    }
}
