use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::types::*;
use crate::transport::{ChainTransport, SignerProvider, TransportError};

/// Client wrapper for Ethereum JSON-RPC calls.
pub struct EthRpcClient {
    http_client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl EthRpcClient {
    /// Create a new JSON-RPC client.
    pub fn new(rpc_url: &str) -> Self {
        Self::with_http_client(rpc_url, Client::new())
    }

    /// Use a preconfigured HTTP client (timeouts, proxy settings).
    pub fn with_http_client(rpc_url: &str, http_client: Client) -> Self {
        Self {
            http_client,
            rpc_url: rpc_url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Send a JSON-RPC request and return the raw `result` value.
    async fn send_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = EthRpcRequest::new(id, method, params);
        debug!("Sending JSON-RPC request: id={}, method={}", id, method);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("JSON-RPC node returned HTTP {}: {}", status, body);
            return Err(TransportError::Network(format!(
                "HTTP error: {} - {}",
                status, body
            )));
        }

        let rpc_response: EthRpcResponse = response.json().await.map_err(|e| {
            TransportError::Network(format!("Failed to parse {} response: {}", method, e))
        })?;

        if let Some(err) = rpc_response.error {
            error!(
                "JSON-RPC error: method={}, code={}, message={}",
                method, err.code, err.message
            );
            return Err(TransportError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(rpc_response.result.unwrap_or(serde_json::Value::Null))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, TransportError> {
        let result = self.send_request(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| TransportError::Decode(format!("{} result: {}", method, e)))
    }

    /// Accounts managed by the node.
    pub async fn accounts(&self) -> Result<Vec<Address>, TransportError> {
        self.request("eth_accounts", serde_json::json!([])).await
    }

    /// Chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        let id: U64 = self.request("eth_chainId", serde_json::json!([])).await?;
        Ok(id.to::<u64>())
    }
}

#[async_trait]
impl ChainTransport for EthRpcClient {
    async fn block_number(&self) -> Result<u64, TransportError> {
        let number: U64 = self.request("eth_blockNumber", serde_json::json!([])).await?;
        Ok(number.to::<u64>())
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, TransportError> {
        self.request("eth_sendTransaction", serde_json::json!([tx]))
            .await
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, TransportError> {
        self.request("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
            .await
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<RpcLog>, TransportError> {
        self.request("eth_getLogs", filter.to_params()).await
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, TransportError> {
        self.request("eth_call", serde_json::json!([request, "latest"]))
            .await
    }
}

#[async_trait]
impl SignerProvider for EthRpcClient {
    async fn signer(&self, index: usize) -> Result<Address, TransportError> {
        let accounts = self.accounts().await?;
        accounts.get(index).copied().ok_or_else(|| {
            TransportError::Decode(format!(
                "node manages {} accounts, no signer at index {}",
                accounts.len(),
                index
            ))
        })
    }
}
