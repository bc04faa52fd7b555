//! # clusterdb-core
//!
//! Core types and error handling shared by the clusterdb crates.
//!
//! This crate provides the foundational types the retry core works with:
//!
//! - **Errors**: The failure taxonomy (network, operation, unsupported feature)
//! - **Codes**: Server error codes the client reacts to
//! - **Settings**: Retry policy configuration
//! - **Write concern**: Acknowledgment requirements for writes
//! - **Identifiers**: Session-scoped write-attempt numbers
//!
//! ## Example
//!
//! ```rust
//! use clusterdb_core::{
//!     errors::{Error, OperationFailure},
//!     settings::RetrySettings,
//!     write_concern::WriteConcern,
//!     identifier::TxnNumberSequence,
//! };
//!
//! let settings = RetrySettings::new().max_read_retries(2);
//! assert_eq!(settings.max_read_retries, 2);
//!
//! let err: Error = OperationFailure::new("not master").with_code(10107).into();
//! assert_eq!(err.code(), Some(10107));
//!
//! assert!(!WriteConcern::unacknowledged().is_acknowledged());
//!
//! let txn_numbers = TxnNumberSequence::new();
//! assert_eq!(txn_numbers.next()?.get(), 1);
//! # Ok::<(), Error>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codes;
pub mod errors;
pub mod identifier;
pub mod settings;
pub mod write_concern;

// Re-exports for convenience
pub use errors::{
    Error, NetworkError, NetworkErrorKind, OperationFailure, Result, UnsupportedFeature,
};
pub use identifier::{TxnNumber, TxnNumberSequence};
pub use settings::RetrySettings;
pub use write_concern::{Acknowledgment, WriteConcern};

/// Prelude module for common imports.
///
/// ```rust
/// use clusterdb_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{Error, NetworkError, OperationFailure, Result, UnsupportedFeature};
    pub use crate::identifier::{TxnNumber, TxnNumberSequence};
    pub use crate::settings::RetrySettings;
    pub use crate::write_concern::WriteConcern;
}
