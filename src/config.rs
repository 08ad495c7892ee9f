use anyhow::{anyhow, bail, Context, Result};
use alloy_primitives::Address;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::context::ExecutionSettings;

/// Dice client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint URL
    pub eth_rpc_url: String,
    /// Deployed dice contract
    pub dice_address: Address,
    /// Betting token; resolved from the dice contract when unset
    pub token_address: Option<Address>,
    /// Index into the node's managed accounts
    pub signer_index: usize,
    /// Explicit signer, takes precedence over `signer_index`
    pub signer_address: Option<Address>,
    /// Blocks behind the head searched for events
    pub event_window_blocks: u64,
    /// Inclusion deadline; unset waits indefinitely
    pub confirmation_timeout: Option<Duration>,
    /// Receipt polling interval
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    /// Call dotenvy::dotenv() before calling this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let eth_rpc_url = var("ETH_RPC_URL").unwrap_or_else(|| "http://127.0.0.1:8545".to_string());

        let dice_address = match (var("DICE_ADDRESS"), var("DICE_ARTIFACT")) {
            (Some(address), _) => address
                .parse::<Address>()
                .context("DICE_ADDRESS must be a 0x-prefixed address")?,
            (None, Some(path)) => artifact_address(Path::new(&path))?,
            (None, None) => bail!("DICE_ADDRESS or DICE_ARTIFACT must be set in environment or .env file"),
        };

        let token_address = var("TOKEN_ADDRESS")
            .map(|a| a.parse::<Address>())
            .transpose()
            .context("TOKEN_ADDRESS must be a 0x-prefixed address")?;

        let signer_address = var("SIGNER_ADDRESS")
            .map(|a| a.parse::<Address>())
            .transpose()
            .context("SIGNER_ADDRESS must be a 0x-prefixed address")?;

        let signer_index: usize = var("SIGNER_INDEX")
            .unwrap_or_else(|| "0".to_string())
            .parse()
            .context("SIGNER_INDEX must be a valid usize")?;

        let event_window_blocks: u64 = var("EVENT_WINDOW_BLOCKS")
            .unwrap_or_else(|| "20".to_string())
            .parse()
            .context("EVENT_WINDOW_BLOCKS must be a valid u64")?;

        let confirmation_timeout = var("CONFIRMATION_TIMEOUT_SECS")
            .map(|s| s.parse::<u64>().map(Duration::from_secs))
            .transpose()
            .context("CONFIRMATION_TIMEOUT_SECS must be a whole number of seconds")?;

        let poll_interval = var("RECEIPT_POLL_INTERVAL_MS")
            .unwrap_or_else(|| "1000".to_string())
            .parse::<u64>()
            .map(Duration::from_millis)
            .context("RECEIPT_POLL_INTERVAL_MS must be a valid u64")?;

        Ok(Config {
            eth_rpc_url,
            dice_address,
            token_address,
            signer_index,
            signer_address,
            event_window_blocks,
            confirmation_timeout,
            poll_interval,
        })
    }

    pub fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            event_window_blocks: self.event_window_blocks,
            confirmation_timeout: self.confirmation_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

/// Address of the most recent deployment recorded in a build artifact.
fn artifact_address(path: &Path) -> Result<Address> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read artifact {}", path.display()))?;
    parse_artifact(&raw).with_context(|| format!("invalid artifact {}", path.display()))
}

fn parse_artifact(raw: &str) -> Result<Address> {
    let artifact: serde_json::Value = serde_json::from_str(raw)?;
    let networks = artifact
        .get("networks")
        .and_then(|n| n.as_object())
        .ok_or_else(|| anyhow!("missing networks object"))?;

    let (network, deployment) = networks
        .iter()
        .last()
        .ok_or_else(|| anyhow!("no deployments recorded"))?;

    deployment
        .get("address")
        .and_then(|a| a.as_str())
        .ok_or_else(|| anyhow!("network {} has no address", network))?
        .parse::<Address>()
        .with_context(|| format!("network {} address is malformed", network))
}
