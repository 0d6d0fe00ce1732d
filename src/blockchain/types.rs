//! Ledger-facing types and error definitions.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export NodeConfig from config module to avoid duplication
pub use crate::config::schema::NodeConfig;

/// Opaque identifier the node returns on accepting a request (a deploy hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(String);

impl Receipt {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Receipt {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Receipt {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Terminal verdict recorded by the ledger for a receipt.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationResult {
    /// Execution succeeded; carries the node's success body.
    Success(serde_json::Value),
    /// Execution failed; carries the node-reported error text.
    Failure(String),
}

/// Result of a single outcome query.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// No execution result recorded yet.
    Pending,
    /// A terminal result is recorded.
    Executed(ConfirmationResult),
}

/// A submitted and confirmed call.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub receipt: Receipt,
    pub payload: serde_json::Value,
}

/// Errors raised by a single transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP connection or status failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// RPC request timed out.
    #[error("RPC timeout after {0:?}")]
    Timeout(Duration),

    /// Response did not have the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Every configured endpoint failed.
    #[error("All RPC endpoints failed: {0}")]
    AllEndpointsFailed(String),

    /// Connected chain differs from configuration.
    #[error("Chain mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: String, actual: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

/// Errors surfaced by the submit-and-confirm protocol.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Submission was never accepted.
    #[error("Submission failed after {attempts} attempts: {source}")]
    Remote {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// No terminal outcome observed within the poll budget.
    #[error("Timeout after {polls} polls waiting for {receipt}")]
    Timeout { receipt: Receipt, polls: u32 },

    /// The ledger reported that execution failed.
    #[error("Contract execution: {0}")]
    RemoteExecution(String),

    /// Shutdown was requested while waiting.
    #[error("Cancelled")]
    Cancelled,
}

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
