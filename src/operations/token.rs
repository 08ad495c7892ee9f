use alloy_primitives::{Address, B256, U256};

use super::call_view;
use crate::context::ClientContext;
use crate::contracts::IERC20;
use crate::error::Result;
use crate::executor::{ContractCall, ExecuteOptions};
use crate::mapper;
use crate::results::{ApprovalResult, TokenInfo, TransferResult};
use crate::transport::ChainTransport;
use crate::units::{self, DisplayAmount};

/// The ERC-20 token wagers are denominated in.
pub struct Token<'a, T> {
    ctx: &'a ClientContext<T>,
}

impl<'a, T: ChainTransport> Token<'a, T> {
    pub fn new(ctx: &'a ClientContext<T>) -> Self {
        Self { ctx }
    }

    pub fn address(&self) -> Address {
        self.ctx.contracts().token
    }

    /// Token decimals as reported by the contract. Never cached.
    pub async fn decimals(&self) -> Result<u8> {
        let ret = call_view(self.ctx.transport(), self.address(), &IERC20::decimalsCall {}).await?;
        Ok(ret._0)
    }

    pub async fn name(&self) -> Result<String> {
        let ret = call_view(self.ctx.transport(), self.address(), &IERC20::nameCall {}).await?;
        Ok(ret._0)
    }

    pub async fn symbol(&self) -> Result<String> {
        let ret = call_view(self.ctx.transport(), self.address(), &IERC20::symbolCall {}).await?;
        Ok(ret._0)
    }

    pub async fn total_supply(&self) -> Result<DisplayAmount> {
        let ret =
            call_view(self.ctx.transport(), self.address(), &IERC20::totalSupplyCall {}).await?;
        Ok(DisplayAmount::from_wire(ret._0, self.decimals().await?))
    }

    pub async fn balance_of(&self, owner: Address) -> Result<DisplayAmount> {
        let ret = call_view(
            self.ctx.transport(),
            self.address(),
            &IERC20::balanceOfCall { owner },
        )
        .await?;
        Ok(DisplayAmount::from_wire(ret._0, self.decimals().await?))
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<DisplayAmount> {
        let ret = call_view(
            self.ctx.transport(),
            self.address(),
            &IERC20::allowanceCall { owner, spender },
        )
        .await?;
        Ok(DisplayAmount::from_wire(ret._0, self.decimals().await?))
    }

    pub async fn info(&self) -> Result<TokenInfo> {
        Ok(TokenInfo {
            name: self.name().await?,
            symbol: self.symbol().await?,
            decimals: self.decimals().await?,
            total_supply: self.total_supply().await?,
        })
    }

    /// Allow `spender` to move the signer's tokens. `None` grants the maximum allowance.
    pub async fn approve(
        &self,
        spender: Address,
        amount: Option<&str>,
        options: &ExecuteOptions,
    ) -> Result<ApprovalResult> {
        let decimals = self.decimals().await?;
        let amount = match amount {
            Some(display) => units::display_to_wire(display, decimals)?,
            None => U256::MAX,
        };

        let call = ContractCall::new(self.address(), &IERC20::approveCall { spender, amount });
        let record = self
            .ctx
            .executor()
            .execute(&call, mapper::APPROVE_EVENTS, options)
            .await?;
        mapper::approval(&record, decimals)
    }

    pub async fn transfer(
        &self,
        to: Address,
        amount: &str,
        options: &ExecuteOptions,
    ) -> Result<TransferResult> {
        let decimals = self.decimals().await?;
        let amount = units::display_to_wire(amount, decimals)?;

        let call = ContractCall::new(self.address(), &IERC20::transferCall { to, amount });
        let record = self
            .ctx
            .executor()
            .execute(&call, mapper::TRANSFER_EVENTS, options)
            .await?;
        mapper::transfer(&record, decimals)
    }

    pub async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: &str,
        options: &ExecuteOptions,
    ) -> Result<TransferResult> {
        let decimals = self.decimals().await?;
        let amount = units::display_to_wire(amount, decimals)?;

        let call = ContractCall::new(
            self.address(),
            &IERC20::transferFromCall { from, to, amount },
        );
        let record = self
            .ctx
            .executor()
            .execute(&call, mapper::TRANSFER_EVENTS, options)
            .await?;
        mapper::transfer(&record, decimals)
    }

    /// Re-resolve a submitted transfer, e.g. with a wider event window.
    pub async fn resolve_transfer(
        &self,
        tx_hash: B256,
        options: &ExecuteOptions,
    ) -> Result<TransferResult> {
        let decimals = self
            .decimals()
            .await
            .map_err(|e| e.after_submission(tx_hash))?;
        let record = self
            .ctx
            .executor()
            .resolve(tx_hash, self.address(), mapper::TRANSFER_EVENTS, options)
            .await?;
        mapper::transfer(&record, decimals)
    }
}
