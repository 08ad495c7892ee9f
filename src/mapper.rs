//! Mapping correlated events into caller-facing results.
//!
//! Each operation declares the event kinds it needs; the mapper checks that
//! the required ones are present, converts amounts to display scale, and
//! picks the session state.

use alloy_primitives::{Address, U256};

use crate::contracts::{EventKind, IDice, IERC20};
use crate::error::{ExecutionError, Result};
use crate::executor::TransactionRecord;
use crate::results::*;
use crate::units::DisplayAmount;

pub const CREATE_EVENTS: &[EventKind] = &[EventKind::GameCreated];
pub const JOIN_EVENTS: &[EventKind] = &[EventKind::GameStarted];
/// Rolled is required; the other two are mutually exclusive outcomes.
pub const PLAY_EVENTS: &[EventKind] = &[
    EventKind::Rolled,
    EventKind::GameRestarted,
    EventKind::GameEnded,
];
pub const TIMEOUT_EVENTS: &[EventKind] = &[EventKind::GameEnded];
pub const APPROVE_EVENTS: &[EventKind] = &[EventKind::Approval];
pub const TRANSFER_EVENTS: &[EventKind] = &[EventKind::Transfer];

/// Narrow a uint256 id or timestamp.
fn narrow(value: U256, event: &'static str, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| ExecutionError::MalformedEvent {
        event,
        reason: format!("{} = {} does not fit in u64", field, value),
    })
}

/// The zero address marks "no address" on chain.
fn non_zero(address: Address) -> Option<Address> {
    (address != Address::ZERO).then_some(address)
}

pub fn game_created(record: &TransactionRecord, decimals: u8) -> Result<GameCreatedResult> {
    let event = record.required::<IDice::GameCreated>()?;
    Ok(GameCreatedResult {
        tx_hash: record.tx_hash(),
        game_id: narrow(event.id, "GameCreated", "id")?,
        game_creator: event.creator,
        bet_amount: DisplayAmount::from_wire(event.betAmount, decimals),
        creation_time: narrow(event.timestamp, "GameCreated", "timestamp")?,
    })
}

pub fn game_joined(record: &TransactionRecord, decimals: u8) -> Result<GameJoinedResult> {
    let event = record.required::<IDice::GameStarted>()?;
    Ok(GameJoinedResult {
        tx_hash: record.tx_hash(),
        game_id: narrow(event.id, "GameStarted", "id")?,
        player1: event.player1,
        player2: event.player2,
        bet_amount: DisplayAmount::from_wire(event.betAmount, decimals),
        game_start_time: narrow(event.timestamp, "GameStarted", "timestamp")?,
        game_timeout_at: narrow(event.timeout, "GameStarted", "timeout")?,
    })
}

pub fn turn_played(record: &TransactionRecord, decimals: u8) -> Result<TurnResult> {
    let rolled = record.required::<IDice::Rolled>()?;
    let state = turn_state(
        record.optional::<IDice::GameRestarted>(),
        record.optional::<IDice::GameEnded>(),
        decimals,
    )?;

    Ok(TurnResult {
        tx_hash: record.tx_hash(),
        game_id: narrow(rolled.id, "Rolled", "id")?,
        timestamp: narrow(rolled.timestamp, "Rolled", "timestamp")?,
        player_rolling: rolled.player,
        player_rolled: narrow(rolled.roll, "Rolled", "roll")?,
        state,
    })
}

/// Session state after a roll. Restarted outranks ended, which outranks ongoing.
pub fn turn_state(
    restarted: Option<&IDice::GameRestarted>,
    ended: Option<&IDice::GameEnded>,
    decimals: u8,
) -> Result<GameState> {
    if let Some(event) = restarted {
        return Ok(GameState::Restarted(RestartedState {
            player1: event.player1,
            player2: event.player2,
            bet_amount: DisplayAmount::from_wire(event.betAmount, decimals),
            new_timeout: narrow(event.newTimeout, "GameRestarted", "newTimeout")?,
        }));
    }

    if let Some(event) = ended {
        return Ok(GameState::Ended(ended_state(event, decimals)?));
    }

    Ok(GameState::Ongoing)
}

pub fn ended_state(event: &IDice::GameEnded, decimals: u8) -> Result<EndedState> {
    let winner = non_zero(event.winner);
    Ok(EndedState {
        has_winner: winner.is_some(),
        winner,
        prize: DisplayAmount::from_wire(event.prize, decimals),
        game_timeout: narrow(event.gameTimeout, "GameEnded", "gameTimeout")?,
    })
}

pub fn game_timed_out(record: &TransactionRecord, decimals: u8) -> Result<TimeoutResult> {
    let event = record.required::<IDice::GameEnded>()?;
    Ok(TimeoutResult {
        tx_hash: record.tx_hash(),
        game_id: narrow(event.id, "GameEnded", "id")?,
        timestamp: narrow(event.timestamp, "GameEnded", "timestamp")?,
        outcome: ended_state(event, decimals)?,
    })
}

pub fn approval(record: &TransactionRecord, decimals: u8) -> Result<ApprovalResult> {
    let event = record.required::<IERC20::Approval>()?;
    Ok(ApprovalResult {
        tx_hash: record.tx_hash(),
        owner: event.owner,
        spender: event.spender,
        allowance: DisplayAmount::from_wire(event.value, decimals),
    })
}

pub fn transfer(record: &TransactionRecord, decimals: u8) -> Result<TransferResult> {
    let event = record.required::<IERC20::Transfer>()?;
    Ok(TransferResult {
        tx_hash: record.tx_hash(),
        from: event.from,
        to: event.to,
        amount: DisplayAmount::from_wire(event.value, decimals),
    })
}

/// Reshape a `getGame` record.
pub fn game_record(game: &IDice::Game, decimals: u8) -> Result<GameRecord> {
    Ok(GameRecord {
        game_id: narrow(game.id, "Game", "id")?,
        player1: game.player1,
        player2: non_zero(game.player2),
        bet_amount: DisplayAmount::from_wire(game.betAmount, decimals),
        creation_time: narrow(game.creationTime, "Game", "creationTime")?,
        timeout: narrow(game.timeout, "Game", "timeout")?,
        current_turn: non_zero(game.currentTurn),
        ended: game.ended,
    })
}
