//! Dice Wagering Client
//!
//! Drives a two-player dice wagering contract and its ERC-20 betting token
//! over Ethereum JSON-RPC. Each state-changing operation submits a
//! transaction from a node-managed signer, waits for inclusion, and
//! resolves the events emitted by *that* transaction into a typed result.
//!
//! # Architecture
//!
//! ```text
//! Caller (CLI / library user)
//!     |
//!     | create_game / join_game / play_game / timeout_game / approve ...
//!     v
//! operations (DiceGame, Token) -- display <-> raw amounts (units)
//!     |
//!     | ContractCall + expected EventKinds
//!     v
//! TransactionExecutor -- submit, await inclusion, windowed log query
//!     |                   correlate by tx hash, decode
//!     v
//! ChainTransport (EthRpcClient over HTTP)
//!     |
//!     v
//! Ethereum node
//! ```
//!
//! # Modules
//!
//! - `config` - Environment and configuration management
//! - `context` - Shared client context (transport, signer, addresses, settings)
//! - `contracts` - ABI bindings and the closed set of contract events
//! - `correlator` - Selects the event emitted by a given transaction
//! - `executor` - Transaction submission and result resolution
//! - `mapper` - Decoded events to caller-facing results
//! - `operations` - One async method per contract operation
//! - `results` - Result shapes returned to callers
//! - `rpc` - Ethereum JSON-RPC client and wire types
//! - `transport` - Node-facing traits
//! - `units` - Token amount scaling and timestamp formatting

pub mod config;
pub mod context;
pub mod contracts;
pub mod correlator;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod operations;
pub mod results;
pub mod rpc;
pub mod transport;
pub mod units;

#[cfg(test)]
mod mock;

pub use context::{ClientContext, ContractAddresses, ExecutionSettings};
pub use error::{ExecutionError, Result};
pub use executor::{ExecuteOptions, TransactionExecutor, TransactionRecord};
