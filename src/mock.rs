//! In-memory node for tests. Scripted transaction outcomes are consumed in
//! submission order; every accepted transaction is mined into its own block.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{keccak256, Address, Bytes, B256, U64};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;

use crate::context::{ClientContext, ContractAddresses, ExecutionSettings};
use crate::contracts::IERC20;
use crate::rpc::types::{CallRequest, LogFilter, RpcLog, TransactionReceipt, TransactionRequest};
use crate::transport::{ChainTransport, SignerProvider, TransportError};

pub const DICE: Address = Address::repeat_byte(0xd1);
pub const TOKEN: Address = Address::repeat_byte(0x70);
pub const SIGNER: Address = Address::repeat_byte(0xa1);

const GENESIS_HEAD: u64 = 100;

pub fn test_context(node: MockNode) -> ClientContext<MockNode> {
    ClientContext::new(
        node,
        SIGNER,
        ContractAddresses {
            dice: DICE,
            token: TOKEN,
        },
        ExecutionSettings {
            poll_interval: Duration::from_millis(5),
            ..ExecutionSettings::default()
        },
    )
}

#[derive(Debug, Clone)]
enum Outcome {
    Included { status: u64 },
    Rejected(String),
    NeverIncluded,
}

/// What the node does with the next submitted transaction.
#[derive(Debug, Clone)]
pub struct ScriptedTx {
    outcome: Outcome,
    logs: Vec<(Address, Vec<B256>, Bytes)>,
    blocks_after: u64,
}

impl ScriptedTx {
    pub fn included() -> Self {
        Self {
            outcome: Outcome::Included { status: 1 },
            logs: Vec::new(),
            blocks_after: 0,
        }
    }

    pub fn reverted() -> Self {
        Self {
            outcome: Outcome::Included { status: 0 },
            ..Self::included()
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            outcome: Outcome::Rejected(message.to_string()),
            ..Self::included()
        }
    }

    pub fn never_included() -> Self {
        Self {
            outcome: Outcome::NeverIncluded,
            ..Self::included()
        }
    }

    pub fn emit<E: SolEvent>(self, address: Address, event: &E) -> Self {
        let log = event.encode_log_data();
        self.emit_raw(address, log.topics().to_vec(), log.data.to_vec())
    }

    pub fn emit_raw(mut self, address: Address, topics: Vec<B256>, data: Vec<u8>) -> Self {
        self.logs.push((address, topics, Bytes::from(data)));
        self
    }

    /// Advance the head by `blocks` after this transaction's block.
    pub fn then_mine(mut self, blocks: u64) -> Self {
        self.blocks_after = blocks;
        self
    }
}

#[derive(Default)]
struct NodeState {
    head: u64,
    nonce: u64,
    offline: bool,
    logs_unavailable: bool,
    scripts: Vec<ScriptedTx>,
    receipts: HashMap<B256, TransactionReceipt>,
    logs: Vec<RpcLog>,
    submissions: Vec<TransactionRequest>,
    tx_hashes: Vec<B256>,
    call_responses: HashMap<(Address, [u8; 4]), Bytes>,
    call_counts: HashMap<(Address, [u8; 4]), usize>,
}

impl NodeState {
    fn next_hash(&mut self) -> B256 {
        self.nonce += 1;
        keccak256(self.nonce.to_be_bytes())
    }

    fn record_log(&mut self, address: Address, topics: Vec<B256>, data: Bytes, tx_hash: B256) {
        let log_index = self.logs.len() as u64;
        self.logs.push(RpcLog {
            address,
            topics,
            data,
            block_number: Some(U64::from(self.head)),
            transaction_hash: Some(tx_hash),
            transaction_index: Some(U64::ZERO),
            log_index: Some(U64::from(log_index)),
            removed: false,
        });
    }
}

pub struct MockNode {
    state: Mutex<NodeState>,
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(NodeState {
                head: GENESIS_HEAD,
                ..NodeState::default()
            }),
        }
    }

    pub fn script(&self, tx: ScriptedTx) {
        self.state.lock().unwrap().scripts.push(tx);
    }

    /// Mine a block holding `event` from some other transaction.
    pub fn push_foreign_log<E: SolEvent>(&self, address: Address, event: &E) {
        let mut state = self.state.lock().unwrap();
        state.head += 1;
        let tx_hash = state.next_hash();
        let log = event.encode_log_data();
        state.record_log(address, log.topics().to_vec(), log.data, tx_hash);
    }

    pub fn set_call_response(&self, to: Address, selector: [u8; 4], data: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .call_responses
            .insert((to, selector), Bytes::from(data));
    }

    pub fn set_decimals(&self, token: Address, decimals: u8) {
        self.set_call_response(
            token,
            IERC20::decimalsCall::SELECTOR,
            IERC20::decimalsCall::abi_encode_returns(&(decimals,)),
        );
    }

    pub fn call_count(&self, to: Address, selector: [u8; 4]) -> usize {
        self.state
            .lock()
            .unwrap()
            .call_counts
            .get(&(to, selector))
            .copied()
            .unwrap_or(0)
    }

    pub fn submissions(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Hashes of accepted transactions, in submission order.
    pub fn tx_hashes(&self) -> Vec<B256> {
        self.state.lock().unwrap().tx_hashes.clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Fail only `eth_getLogs`, leaving submission and receipts working.
    pub fn set_logs_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().logs_unavailable = unavailable;
    }

    fn online(&self) -> Result<std::sync::MutexGuard<'_, NodeState>, TransportError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(TransportError::Network("connection refused".to_string()));
        }
        Ok(state)
    }
}

#[async_trait]
impl ChainTransport for MockNode {
    async fn block_number(&self) -> Result<u64, TransportError> {
        Ok(self.online()?.head)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256, TransportError> {
        let mut state = self.online()?;
        state.submissions.push(tx.clone());

        let script = if state.scripts.is_empty() {
            ScriptedTx::included()
        } else {
            state.scripts.remove(0)
        };

        let status = match script.outcome {
            Outcome::Rejected(message) => {
                return Err(TransportError::Rpc {
                    code: -32000,
                    message,
                })
            }
            Outcome::NeverIncluded => {
                let tx_hash = state.next_hash();
                state.tx_hashes.push(tx_hash);
                return Ok(tx_hash);
            }
            Outcome::Included { status } => status,
        };

        state.head += 1;
        let tx_hash = state.next_hash();
        state.tx_hashes.push(tx_hash);

        let block = state.head;
        state.receipts.insert(
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                block_number: U64::from(block),
                block_hash: Some(keccak256(block.to_be_bytes())),
                from: Some(tx.from),
                to: Some(tx.to),
                gas_used: Some(U64::from(21_000)),
                status: Some(U64::from(status)),
            },
        );
        if status == 1 {
            for (address, topics, data) in script.logs {
                state.record_log(address, topics, data, tx_hash);
            }
        }
        state.head += script.blocks_after;

        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, TransportError> {
        Ok(self.online()?.receipts.get(&tx_hash).cloned())
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<RpcLog>, TransportError> {
        let state = self.online()?;
        if state.logs_unavailable {
            return Err(TransportError::Network("eth_getLogs timed out".to_string()));
        }
        Ok(state
            .logs
            .iter()
            .filter(|log| log.address == filter.address)
            .filter(|log| log.topics.first() == Some(&filter.topic0))
            .filter(|log| {
                log.block_number
                    .map(|b| filter.contains_block(b.to::<u64>()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn call(&self, request: CallRequest) -> Result<Bytes, TransportError> {
        let mut state = self.online()?;
        let mut selector = [0u8; 4];
        if let Some(prefix) = request.data.get(..4) {
            selector.copy_from_slice(prefix);
        }
        *state.call_counts.entry((request.to, selector)).or_insert(0) += 1;

        state
            .call_responses
            .get(&(request.to, selector))
            .cloned()
            .ok_or(TransportError::Rpc {
                code: -32000,
                message: "execution reverted".to_string(),
            })
    }
}

#[async_trait]
impl SignerProvider for MockNode {
    async fn signer(&self, index: usize) -> Result<Address, TransportError> {
        match index {
            0 => Ok(SIGNER),
            n => Ok(Address::repeat_byte(n as u8)),
        }
    }
}
