//! Node-facing seams.
//!
//! - `ChainTransport` - the JSON-RPC surface the executor consumes
//! - `SignerProvider` - resolves a bindable signing identity
//!
//! Both are object-safe so tests can substitute an in-memory node.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::rpc::types::{CallRequest, LogFilter, RpcLog, TransactionReceipt, TransactionRequest};

/// Transport layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection failure, HTTP error status, or unreadable body.
    #[error("Network error: {0}")]
    Network(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered but the result had an unexpected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Pure chain access: no knowledge of the dice contract.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Current head block number.
    async fn block_number(&self) -> Result<u64, TransportError>;

    /// Submit a transaction signed by a node-managed account.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, TransportError>;

    /// Receipt for an included transaction, or None while still pending.
    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, TransportError>;

    /// Logs matching an address/topic0 filter within a block range.
    async fn logs(&self, filter: &LogFilter) -> Result<Vec<RpcLog>, TransportError>;

    /// Read-only contract call against the latest block.
    async fn call(&self, request: CallRequest) -> Result<Bytes, TransportError>;
}

/// Supplies signing identities. Nonce sequencing is the provider's concern.
#[async_trait]
pub trait SignerProvider: Send + Sync {
    /// Address of the signer at `index`.
    async fn signer(&self, index: usize) -> Result<Address, TransportError>;
}
