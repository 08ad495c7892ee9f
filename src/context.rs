//! Explicit client context: built once, shared by reference.

use std::time::Duration;

use alloy_primitives::Address;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::executor::TransactionExecutor;
use crate::operations::{dice, DiceGame, Token};
use crate::rpc::EthRpcClient;
use crate::transport::{ChainTransport, SignerProvider};

/// Deployed contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub dice: Address,
    pub token: Address,
}

/// Defaults applied to every execution unless overridden per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Blocks behind the head searched for events
    pub event_window_blocks: u64,
    /// Inclusion deadline; None waits indefinitely
    pub confirmation_timeout: Option<Duration>,
    /// Delay between receipt polls
    pub poll_interval: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            event_window_blocks: 20,
            confirmation_timeout: None,
            poll_interval: Duration::from_millis(1000),
        }
    }
}

/// Transport, bound signer, contract addresses and settings.
///
/// Holds no mutable state, so concurrent operations may share one `&ClientContext`.
pub struct ClientContext<T> {
    transport: T,
    signer: Address,
    contracts: ContractAddresses,
    settings: ExecutionSettings,
}

impl<T: ChainTransport> ClientContext<T> {
    pub fn new(
        transport: T,
        signer: Address,
        contracts: ContractAddresses,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            transport,
            signer,
            contracts,
            settings,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn contracts(&self) -> ContractAddresses {
        self.contracts
    }

    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    pub fn executor(&self) -> TransactionExecutor<'_, T> {
        TransactionExecutor::new(self)
    }

    pub fn dice(&self) -> DiceGame<'_, T> {
        DiceGame::new(self)
    }

    pub fn token(&self) -> Token<'_, T> {
        Token::new(self)
    }
}

impl ClientContext<EthRpcClient> {
    /// Connect to the configured node, bind the signer, and resolve the token address.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = EthRpcClient::new(&config.eth_rpc_url);
        let chain_id = client.chain_id().await?;

        let signer = match config.signer_address {
            Some(address) => address,
            None => client.signer(config.signer_index).await?,
        };

        let token = match config.token_address {
            Some(address) => address,
            None => dice::query_token_contract(&client, config.dice_address).await?,
        };

        info!(
            "Connected to {} (chain {}): signer={}, dice={}, token={}",
            client.rpc_url(),
            chain_id,
            signer,
            config.dice_address,
            token
        );

        Ok(Self::new(
            client,
            signer,
            ContractAddresses {
                dice: config.dice_address,
                token,
            },
            config.execution_settings(),
        ))
    }
}
