//! Error types for clusterdb.
//!
//! Every failure raised while talking to a cluster belongs to exactly one
//! variant of [`Error`]. The retry core decides what to do from the variant
//! alone, plus the message and code of an [`OperationFailure`].

use crate::codes;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for clusterdb operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure: the connection was lost or timed out.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Structured error returned by the server.
    #[error(transparent)]
    Operation(#[from] OperationFailure),

    /// Client-detected incompatibility with the server or the request.
    #[error(transparent)]
    UnsupportedFeature(#[from] UnsupportedFeature),

    /// Invalid settings or write concern.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Client-side bookkeeping failed.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other application-level failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a socket error.
    pub fn socket(message: impl Into<String>) -> Self {
        Self::Network(NetworkError::socket(message))
    }

    /// Create a socket timeout error.
    pub fn socket_timeout(message: impl Into<String>) -> Self {
        Self::Network(NetworkError::timeout(message))
    }

    /// Create an operation failure with only a message.
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation(OperationFailure::new(message))
    }

    /// Create an unsupported feature error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFeature(UnsupportedFeature::new(message))
    }

    /// Check if this is a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Get the server operation failure, if this is one.
    pub fn as_operation_failure(&self) -> Option<&OperationFailure> {
        match self {
            Self::Operation(failure) => Some(failure),
            _ => None,
        }
    }

    /// Get the server error code, if any.
    pub fn code(&self) -> Option<i32> {
        self.as_operation_failure().and_then(|f| f.code)
    }
}

/// Kind of transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    /// The socket was closed or could not be used.
    Socket,
    /// The socket did not respond in time.
    Timeout,
}

/// Connection-level failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    /// Socket error or timeout.
    pub kind: NetworkErrorKind,
    /// Error message.
    pub message: String,
    /// Address of the server the socket was connected to.
    pub address: Option<String>,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NetworkErrorKind::Socket => write!(f, "Socket error: {}", self.message)?,
            NetworkErrorKind::Timeout => write!(f, "Socket timeout: {}", self.message)?,
        }
        if let Some(ref address) = self.address {
            write!(f, " ({})", address)?;
        }
        Ok(())
    }
}

impl NetworkError {
    /// Create a socket error.
    pub fn socket(message: impl Into<String>) -> Self {
        Self {
            kind: NetworkErrorKind::Socket,
            message: message.into(),
            address: None,
        }
    }

    /// Create a socket timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: NetworkErrorKind::Timeout,
            message: message.into(),
            address: None,
        }
    }

    /// Set the server address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Check if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        self.kind == NetworkErrorKind::Timeout
    }
}

/// Error reported by the server for a command.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    /// Error message from the server.
    pub message: String,
    /// Numeric error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Symbolic name of the error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        match (self.code, &self.code_name) {
            (Some(code), Some(name)) => write!(f, " ({}: {})", code, name),
            (Some(code), None) => write!(f, " ({})", code),
            _ => Ok(()),
        }
    }
}

impl OperationFailure {
    /// Create a new operation failure without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            code_name: None,
        }
    }

    /// Set the error code.
    ///
    /// The code name is filled in from the known code table unless one
    /// was already set.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        if self.code_name.is_none() {
            self.code_name = codes::name(code).map(str::to_string);
        }
        self
    }

    /// Set the code name.
    pub fn with_code_name(mut self, name: impl Into<String>) -> Self {
        self.code_name = Some(name.into());
        self
    }
}

/// The request uses something the client or server cannot do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported feature: {message}")]
pub struct UnsupportedFeature {
    /// What was not supported.
    pub message: String,
}

impl UnsupportedFeature {
    /// Create a new unsupported feature error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
