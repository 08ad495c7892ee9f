//! Error taxonomy for transaction execution and result resolution.

use std::time::Duration;

use alloy_primitives::B256;

use crate::transport::TransportError;

/// Classified failure of a caller-facing operation.
///
/// Every operation either returns a complete result or one of these.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Caller-supplied amount is negative, non-numeric, too precise, or out of range.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The node refused the call, or the included transaction reverted.
    #[error("Submission rejected: {0}")]
    SubmissionRejected(String),

    /// The transaction was included but the expected event was not in the queried window.
    /// Retry with a wider event window.
    #[error("{event} event for transaction {tx_hash} not found in blocks {from_block}..={to_block}")]
    EventNotFound {
        event: &'static str,
        tx_hash: B256,
        from_block: u64,
        to_block: u64,
    },

    /// Inclusion was not confirmed before the caller's deadline.
    #[error("Transaction {tx_hash} not confirmed within {waited:?}")]
    Timeout { tx_hash: B256, waited: Duration },

    /// The node connection failed or returned something unusable.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The transaction was submitted but reading its outcome failed.
    /// Resolve it again by hash; resubmitting would repeat the call.
    #[error("Transaction {tx_hash} submitted but not resolved: {reason}")]
    Unresolved { tx_hash: B256, reason: String },

    /// A correlated log failed ABI validation or a field did not fit its target type.
    #[error("Malformed {event} event: {reason}")]
    MalformedEvent { event: &'static str, reason: String },

    /// A read-only call returned data that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),
}

impl ExecutionError {
    /// Whether resolving the same transaction again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExecutionError::EventNotFound { .. } | ExecutionError::Unresolved { .. }
        )
    }

    /// Hash of the already-submitted transaction this error concerns, if any.
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            ExecutionError::EventNotFound { tx_hash, .. }
            | ExecutionError::Timeout { tx_hash, .. }
            | ExecutionError::Unresolved { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }

    /// Tie an upstream failure after submission to its transaction.
    pub(crate) fn after_submission(self, tx_hash: B256) -> Self {
        match self {
            ExecutionError::UpstreamUnavailable(reason) => {
                ExecutionError::Unresolved { tx_hash, reason }
            }
            other => other,
        }
    }
}

impl From<TransportError> for ExecutionError {
    fn from(err: TransportError) -> Self {
        ExecutionError::UpstreamUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
