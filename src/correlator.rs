//! Matching log events to the transaction that produced them.

use alloy_primitives::B256;

use crate::rpc::types::RpcLog;

/// Anything that may carry the hash of its originating transaction.
pub trait Correlate {
    fn transaction_hash(&self) -> Option<B256>;
}

/// Logs retracted by a reorg carry no usable hash.
impl Correlate for RpcLog {
    fn transaction_hash(&self) -> Option<B256> {
        if self.removed {
            return None;
        }
        self.transaction_hash
    }
}

/// First event produced by `tx_hash`, if any. Events without a hash never match.
pub fn find_by_transaction<'a, E: Correlate>(events: &'a [E], tx_hash: &B256) -> Option<&'a E> {
    events
        .iter()
        .find(|event| event.transaction_hash().as_ref() == Some(tx_hash))
}

/// Number of events produced by `tx_hash`.
pub fn count_matches<E: Correlate>(events: &[E], tx_hash: &B256) -> usize {
    events
        .iter()
        .filter(|event| event.transaction_hash().as_ref() == Some(tx_hash))
        .count()
}
