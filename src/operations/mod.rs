//! Caller-facing API: one async method per contract operation.

pub mod dice;
pub mod token;

pub use dice::DiceGame;
pub use token::Token;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::error::{ExecutionError, Result};
use crate::rpc::types::CallRequest;
use crate::transport::ChainTransport;

/// Read-only `eth_call` with ABI-decoded return values.
pub(crate) async fn call_view<T, C>(transport: &T, to: Address, call: &C) -> Result<C::Return>
where
    T: ChainTransport + ?Sized,
    C: SolCall,
{
    debug!("eth_call {} on {}", C::SIGNATURE, to);

    let data = transport
        .call(CallRequest {
            from: None,
            to,
            data: Bytes::from(call.abi_encode()),
        })
        .await?;

    C::abi_decode_returns(&data, true)
        .map_err(|e| ExecutionError::Query(format!("{} returned undecodable data: {}", C::SIGNATURE, e)))
}
