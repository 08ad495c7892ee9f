use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;

use super::call_view;
use crate::context::ClientContext;
use crate::contracts::{EventKind, IDice};
use crate::error::Result;
use crate::executor::{ContractCall, ExecuteOptions, TransactionRecord};
use crate::mapper;
use crate::results::{GameCreatedResult, GameJoinedResult, GameRecord, TimeoutResult, TurnResult};
use crate::transport::ChainTransport;
use crate::units;

type Mapping<R> = fn(&TransactionRecord, u8) -> Result<R>;

/// Betting token address the dice contract was deployed with.
pub async fn query_token_contract<T: ChainTransport + ?Sized>(
    transport: &T,
    dice: Address,
) -> Result<Address> {
    let ret = call_view(transport, dice, &IDice::tokenContractCall {}).await?;
    Ok(ret._0)
}

/// Wager sessions on the dice contract.
pub struct DiceGame<'a, T> {
    ctx: &'a ClientContext<T>,
}

impl<'a, T: ChainTransport> DiceGame<'a, T> {
    pub fn new(ctx: &'a ClientContext<T>) -> Self {
        Self { ctx }
    }

    pub fn address(&self) -> Address {
        self.ctx.contracts().dice
    }

    /// Open a session staking `bet` tokens (display scale).
    pub async fn create_game(
        &self,
        bet: &str,
        options: &ExecuteOptions,
    ) -> Result<GameCreatedResult> {
        let decimals = self.ctx.token().decimals().await?;
        let bet = units::display_to_wire(bet, decimals)?;
        self.run(
            &IDice::createGameCall { bet },
            mapper::CREATE_EVENTS,
            options,
            decimals,
            mapper::game_created,
        )
        .await
    }

    /// Take the second seat of session `id`.
    pub async fn join_game(&self, id: u64, options: &ExecuteOptions) -> Result<GameJoinedResult> {
        let decimals = self.ctx.token().decimals().await?;
        self.run(
            &IDice::joinGameCall { id: U256::from(id) },
            mapper::JOIN_EVENTS,
            options,
            decimals,
            mapper::game_joined,
        )
        .await
    }

    /// Roll for the signer's turn in session `id`.
    pub async fn play_game(&self, id: u64, options: &ExecuteOptions) -> Result<TurnResult> {
        let decimals = self.ctx.token().decimals().await?;
        self.run(
            &IDice::playCall { id: U256::from(id) },
            mapper::PLAY_EVENTS,
            options,
            decimals,
            mapper::turn_played,
        )
        .await
    }

    /// Claim session `id` after the opponent let it time out.
    pub async fn timeout_game(&self, id: u64, options: &ExecuteOptions) -> Result<TimeoutResult> {
        let decimals = self.ctx.token().decimals().await?;
        self.run(
            &IDice::timeoutCall { id: U256::from(id) },
            mapper::TIMEOUT_EVENTS,
            options,
            decimals,
            mapper::game_timed_out,
        )
        .await
    }

    pub async fn resolve_create(
        &self,
        tx_hash: B256,
        options: &ExecuteOptions,
    ) -> Result<GameCreatedResult> {
        self.resolve(tx_hash, mapper::CREATE_EVENTS, options, mapper::game_created)
            .await
    }

    pub async fn resolve_join(
        &self,
        tx_hash: B256,
        options: &ExecuteOptions,
    ) -> Result<GameJoinedResult> {
        self.resolve(tx_hash, mapper::JOIN_EVENTS, options, mapper::game_joined)
            .await
    }

    pub async fn resolve_play(&self, tx_hash: B256, options: &ExecuteOptions) -> Result<TurnResult> {
        self.resolve(tx_hash, mapper::PLAY_EVENTS, options, mapper::turn_played)
            .await
    }

    pub async fn resolve_timeout(
        &self,
        tx_hash: B256,
        options: &ExecuteOptions,
    ) -> Result<TimeoutResult> {
        self.resolve(tx_hash, mapper::TIMEOUT_EVENTS, options, mapper::game_timed_out)
            .await
    }

    pub async fn token_contract(&self) -> Result<Address> {
        query_token_contract(self.ctx.transport(), self.address()).await
    }

    pub async fn get_game(&self, id: u64) -> Result<GameRecord> {
        let ret = call_view(
            self.ctx.transport(),
            self.address(),
            &IDice::getGameCall { id: U256::from(id) },
        )
        .await?;
        mapper::game_record(&ret._0, self.ctx.token().decimals().await?)
    }

    pub async fn get_games(&self) -> Result<Vec<GameRecord>> {
        let ret = call_view(self.ctx.transport(), self.address(), &IDice::getGamesCall {}).await?;
        let decimals = self.ctx.token().decimals().await?;
        ret._0
            .iter()
            .map(|game| mapper::game_record(game, decimals))
            .collect()
    }

    /// `decimals` must be read before the call is submitted.
    async fn run<C: SolCall, R>(
        &self,
        call: &C,
        kinds: &[EventKind],
        options: &ExecuteOptions,
        decimals: u8,
        map: Mapping<R>,
    ) -> Result<R> {
        let record = self
            .ctx
            .executor()
            .execute(&ContractCall::new(self.address(), call), kinds, options)
            .await?;
        map(&record, decimals)
    }

    async fn resolve<R>(
        &self,
        tx_hash: B256,
        kinds: &[EventKind],
        options: &ExecuteOptions,
        map: Mapping<R>,
    ) -> Result<R> {
        let decimals = self
            .ctx
            .token()
            .decimals()
            .await
            .map_err(|e| e.after_submission(tx_hash))?;
        let record = self
            .ctx
            .executor()
            .resolve(tx_hash, self.address(), kinds, options)
            .await?;
        map(&record, decimals)
    }
}
