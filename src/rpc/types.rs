use alloy_primitives::{Address, Bytes, B256, U64};
use serde::{Deserialize, Serialize};

/// JSON-RPC request to the Ethereum node
#[derive(Debug, Serialize)]
pub struct EthRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

impl EthRpcRequest {
    pub fn new(id: u64, method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC response from the Ethereum node
#[derive(Debug, Deserialize)]
pub struct EthRpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<EthRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
pub struct EthRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Parameters for eth_sendTransaction. Gas and nonce are left to the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

/// Parameters for eth_call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

/// Response from eth_getTransactionReceipt (the fields this client reads)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: U64,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub gas_used: Option<U64>,
    /// 1 for success, 0 for a reverted execution. Absent on pre-Byzantium nodes.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)).unwrap_or(true)
    }

    pub fn block(&self) -> u64 {
        self.block_number.to::<u64>()
    }
}

/// A log entry returned by eth_getLogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    /// None while the log is pending
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub transaction_index: Option<U64>,
    #[serde(default)]
    pub log_index: Option<U64>,
    #[serde(default)]
    pub removed: bool,
}

/// Filter for eth_getLogs, bounded to a block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub topic0: B256,
    pub from_block: u64,
    pub to_block: u64,
}

impl LogFilter {
    pub fn to_params(&self) -> serde_json::Value {
        serde_json::json!([{
            "address": self.address,
            "topics": [self.topic0],
            "fromBlock": format!("0x{:x}", self.from_block),
            "toBlock": format!("0x{:x}", self.to_block),
        }])
    }

    pub fn contains_block(&self, block: u64) -> bool {
        (self.from_block..=self.to_block).contains(&block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_status() {
        let receipt: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x2a",
            "status": "0x0",
        }))
        .unwrap();
        assert!(!receipt.succeeded());
        assert_eq!(receipt.block(), 42);

        let legacy: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x1",
        }))
        .unwrap();
        assert!(legacy.succeeded());
    }

    #[test]
    fn test_log_deserialize() {
        let log: RpcLog = serde_json::from_value(serde_json::json!({
            "address": "0x00000000000000000000000000000000000000aa",
            "topics": [format!("0x{}", "ab".repeat(32))],
            "data": "0x",
            "blockNumber": "0x10",
            "transactionHash": format!("0x{}", "cd".repeat(32)),
            "logIndex": "0x0",
            "removed": false,
        }))
        .unwrap();
        assert_eq!(log.block_number, Some(U64::from(16)));
        assert_eq!(log.topics.len(), 1);
        assert!(log.data.is_empty());
    }

    #[test]
    fn test_log_filter_params() {
        let filter = LogFilter {
            address: Address::repeat_byte(0xaa),
            topic0: B256::repeat_byte(0x01),
            from_block: 80,
            to_block: 100,
        };
        let params = filter.to_params();
        assert_eq!(params[0]["fromBlock"], "0x50");
        assert_eq!(params[0]["toBlock"], "0x64");
        assert!(filter.contains_block(80));
        assert!(filter.contains_block(100));
        assert!(!filter.contains_block(101));
    }
}
