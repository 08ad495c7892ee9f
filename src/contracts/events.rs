//! Event catalogue: every log record type an operation can emit.

use alloy_primitives::B256;
use alloy_sol_types::SolEvent;

use super::dice::IDice;
use super::token::IERC20;
use crate::error::{ExecutionError, Result};
use crate::rpc::types::RpcLog;

/// Every event kind the client knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GameCreated,
    GameStarted,
    Rolled,
    GameEnded,
    GameRestarted,
    Transfer,
    Approval,
}

/// A correlated log decoded into its named-field record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    GameCreated(IDice::GameCreated),
    GameStarted(IDice::GameStarted),
    Rolled(IDice::Rolled),
    GameEnded(IDice::GameEnded),
    GameRestarted(IDice::GameRestarted),
    Transfer(IERC20::Transfer),
    Approval(IERC20::Approval),
}

fn decode_log<E: SolEvent>(log: &RpcLog) -> Result<E> {
    E::decode_raw_log(log.topics.iter().copied(), &log.data, true).map_err(|e| {
        ExecutionError::MalformedEvent {
            event: E::SIGNATURE,
            reason: e.to_string(),
        }
    })
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::GameCreated => "GameCreated",
            EventKind::GameStarted => "GameStarted",
            EventKind::Rolled => "Rolled",
            EventKind::GameEnded => "GameEnded",
            EventKind::GameRestarted => "GameRestarted",
            EventKind::Transfer => "Transfer",
            EventKind::Approval => "Approval",
        }
    }

    /// topic0 used to filter this kind's log stream.
    pub fn signature_hash(&self) -> B256 {
        match self {
            EventKind::GameCreated => IDice::GameCreated::SIGNATURE_HASH,
            EventKind::GameStarted => IDice::GameStarted::SIGNATURE_HASH,
            EventKind::Rolled => IDice::Rolled::SIGNATURE_HASH,
            EventKind::GameEnded => IDice::GameEnded::SIGNATURE_HASH,
            EventKind::GameRestarted => IDice::GameRestarted::SIGNATURE_HASH,
            EventKind::Transfer => IERC20::Transfer::SIGNATURE_HASH,
            EventKind::Approval => IERC20::Approval::SIGNATURE_HASH,
        }
    }

    /// Decode and validate a log as this kind.
    pub fn decode(&self, log: &RpcLog) -> Result<DecodedEvent> {
        let event = match self {
            EventKind::GameCreated => DecodedEvent::GameCreated(decode_log(log)?),
            EventKind::GameStarted => DecodedEvent::GameStarted(decode_log(log)?),
            EventKind::Rolled => DecodedEvent::Rolled(decode_log(log)?),
            EventKind::GameEnded => DecodedEvent::GameEnded(decode_log(log)?),
            EventKind::GameRestarted => DecodedEvent::GameRestarted(decode_log(log)?),
            EventKind::Transfer => DecodedEvent::Transfer(decode_log(log)?),
            EventKind::Approval => DecodedEvent::Approval(decode_log(log)?),
        };
        Ok(event)
    }
}

impl DecodedEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DecodedEvent::GameCreated(_) => EventKind::GameCreated,
            DecodedEvent::GameStarted(_) => EventKind::GameStarted,
            DecodedEvent::Rolled(_) => EventKind::Rolled,
            DecodedEvent::GameEnded(_) => EventKind::GameEnded,
            DecodedEvent::GameRestarted(_) => EventKind::GameRestarted,
            DecodedEvent::Transfer(_) => EventKind::Transfer,
            DecodedEvent::Approval(_) => EventKind::Approval,
        }
    }
}

/// Typed access to one variant of `DecodedEvent`.
pub trait ContractEvent: SolEvent {
    const KIND: EventKind;

    fn extract(event: &DecodedEvent) -> Option<&Self>;
}

macro_rules! contract_event {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl ContractEvent for $ty {
                const KIND: EventKind = EventKind::$variant;

                fn extract(event: &DecodedEvent) -> Option<&Self> {
                    match event {
                        DecodedEvent::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for DecodedEvent {
                fn from(event: $ty) -> Self {
                    DecodedEvent::$variant(event)
                }
            }
        )*
    };
}

contract_event! {
    GameCreated => IDice::GameCreated,
    GameStarted => IDice::GameStarted,
    Rolled => IDice::Rolled,
    GameEnded => IDice::GameEnded,
    GameRestarted => IDice::GameRestarted,
    Transfer => IERC20::Transfer,
    Approval => IERC20::Approval,
}
