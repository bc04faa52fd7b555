//! Write retry executors.
//!
//! A write is retried at most once. Without a retryable-writes session only
//! a recognized failover error from the server is retried, since a network
//! failure may hide a write that was already applied. With such a session
//! the transaction number lets the server collapse a duplicate, so network
//! failures are retried too.

use crate::classifier::RetryDisposition;
use crate::facade::{Cluster, Session};
use crate::gate::WriteRetryMode;
use crate::retryable::Retryable;
use clusterdb_core::{Result, TxnNumber, WriteConcern};
use std::future::Future;
use tracing::warn;

impl<C: Cluster> Retryable<C> {
    /// Execute a write, picking the retry protocol from the session and
    /// write concern.
    ///
    /// The operation receives the transaction number to tag the command
    /// with, or `None` on the legacy path.
    pub async fn write_with_retry<F, Fut, T>(
        &self,
        session: Option<&dyn Session>,
        write_concern: Option<&WriteConcern>,
        operation: F,
    ) -> Result<T>
    where
        F: Fn(Option<TxnNumber>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match (WriteRetryMode::select(session, write_concern), session) {
            (WriteRetryMode::Modern, Some(session)) => {
                self.modern_write_with_retry(session, |txn_number| operation(Some(txn_number)))
                    .await
            }
            _ => self.legacy_write_with_retry(|| operation(None)).await,
        }
    }

    /// Execute a write without a retryable-writes session.
    ///
    /// Only a server error confirming a primary failover is retried, once,
    /// after a topology rescan. Network failures, including network errors
    /// reported by the server, are returned as they are.
    pub async fn legacy_write_with_retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => error,
        };

        if self.classifier.classify_for_legacy_write(&error)
            != RetryDisposition::RetryableOperationFailure
        {
            warn!(error = %error, "Legacy write error not retryable");
            return Err(error);
        }

        warn!(error = %error, "Retrying write after failover error");
        self.cluster.scan()?;
        operation().await
    }

    /// Execute a write under a session that negotiated retryable writes.
    ///
    /// One transaction number is drawn from the session before the first
    /// attempt and reused for the retry. Network failures and retryable
    /// server errors are retried once, after a topology rescan.
    pub async fn modern_write_with_retry<F, Fut, T>(
        &self,
        session: &dyn Session,
        operation: F,
    ) -> Result<T>
    where
        F: Fn(TxnNumber) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let txn_number = session.next_txn_num()?;

        let error = match operation(txn_number).await {
            Ok(result) => return Ok(result),
            Err(error) => error,
        };

        match self.classifier.classify(&error) {
            RetryDisposition::NetworkFailure | RetryDisposition::RetryableOperationFailure => {
                warn!(txn_number = txn_number.get(), error = %error, "Retrying write");
                self.cluster.scan()?;
                operation(txn_number).await
            }
            _ => {
                warn!(txn_number = txn_number.get(), error = %error, "Write error not retryable");
                Err(error)
            }
        }
    }
}
