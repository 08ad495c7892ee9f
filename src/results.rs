//! Caller-facing result shapes.
//!
//! Every amount is display-scaled and every id or timestamp is a plain
//! integer. Results serialize to camelCase JSON.

use alloy_primitives::{Address, B256};
use serde::Serialize;

use crate::units::{timestamp_to_human, DisplayAmount};

/// Outcome of `createGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCreatedResult {
    pub tx_hash: B256,
    pub game_id: u64,
    pub game_creator: Address,
    pub bet_amount: DisplayAmount,
    pub creation_time: u64,
}

impl GameCreatedResult {
    pub fn creation_time_human(&self) -> String {
        timestamp_to_human(self.creation_time)
    }
}

/// Outcome of `joinGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameJoinedResult {
    pub tx_hash: B256,
    pub game_id: u64,
    pub player1: Address,
    pub player2: Address,
    pub bet_amount: DisplayAmount,
    pub game_start_time: u64,
    pub game_timeout_at: u64,
}

/// Outcome of `play`: the roll plus what it did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    pub tx_hash: B256,
    pub game_id: u64,
    pub timestamp: u64,
    pub player_rolling: Address,
    pub player_rolled: u64,
    pub state: GameState,
}

/// Session state after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "gameState", rename_all = "lowercase")]
pub enum GameState {
    Ongoing,
    Restarted(RestartedState),
    Ended(EndedState),
}

impl GameState {
    pub fn tag(&self) -> &'static str {
        match self {
            GameState::Ongoing => "ongoing",
            GameState::Restarted(_) => "restarted",
            GameState::Ended(_) => "ended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartedState {
    pub player1: Address,
    pub player2: Address,
    pub bet_amount: DisplayAmount,
    pub new_timeout: u64,
}

/// Final state of a session. `winner` is present exactly when `has_winner` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndedState {
    pub has_winner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Address>,
    pub prize: DisplayAmount,
    pub game_timeout: u64,
}

/// Outcome of `timeout`. The session is always ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutResult {
    pub tx_hash: B256,
    pub game_id: u64,
    pub timestamp: u64,
    #[serde(rename = "state")]
    pub outcome: EndedState,
}

/// Outcome of `approve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResult {
    pub tx_hash: B256,
    pub owner: Address,
    pub spender: Address,
    pub allowance: DisplayAmount,
}

/// Outcome of `transfer` and `transferFrom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub tx_hash: B256,
    pub from: Address,
    pub to: Address,
    pub amount: DisplayAmount,
}

/// Current on-chain record of a game, as returned by `getGame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub game_id: u64,
    pub player1: Address,
    /// None until someone joins
    pub player2: Option<Address>,
    pub bet_amount: DisplayAmount,
    pub creation_time: u64,
    pub timeout: u64,
    pub current_turn: Option<Address>,
    pub ended: bool,
}

/// Token metadata with a display-scaled supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: DisplayAmount,
}
