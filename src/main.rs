//! Dice Wagering Client
//!
//! Command-line entry point. Loads configuration from environment/.env,
//! connects to the node, runs one operation and prints its result as JSON.

use std::time::Duration;

use alloy_primitives::{Address, B256};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dice_client::config::Config;
use dice_client::{ClientContext, ExecuteOptions};

#[derive(Parser, Debug)]
#[command(
    name = "dice-client",
    about = "Dice wagering client: submit game transactions and resolve their results",
    version
)]
struct Cli {
    /// Inclusion deadline in seconds (overrides CONFIRMATION_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    /// Blocks behind the head searched for events (overrides EVENT_WINDOW_BLOCKS)
    #[arg(long, global = true, value_name = "BLOCKS")]
    window: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Token balance of an address (defaults to the signer)
    Balance { owner: Option<Address> },
    /// Token name, symbol, decimals and supply
    Info,
    /// Approve the dice contract to spend the signer's tokens
    Approve {
        /// Display-scaled amount; omit for the maximum allowance
        amount: Option<String>,
    },
    /// Allowance granted by OWNER to SPENDER (defaults: signer, dice contract)
    Allowance {
        owner: Option<Address>,
        spender: Option<Address>,
    },
    /// Transfer tokens from the signer
    Transfer { to: Address, amount: String },
    /// Transfer tokens out of FROM using the signer's allowance
    TransferFrom {
        from: Address,
        to: Address,
        amount: String,
    },
    /// Open a game staking BET tokens
    Create { bet: String },
    /// Join an open game
    Join { id: u64 },
    /// Roll for the signer's turn
    Play { id: u64 },
    /// Claim a game whose opponent timed out
    Timeout { id: u64 },
    /// Resolve an already-submitted createGame transaction
    ResolveCreate { tx_hash: B256 },
    /// Resolve an already-submitted joinGame transaction
    ResolveJoin { tx_hash: B256 },
    /// Resolve an already-submitted play transaction
    ResolvePlay { tx_hash: B256 },
    /// Resolve an already-submitted timeout transaction
    ResolveTimeout { tx_hash: B256 },
    /// Resolve an already-submitted token transfer
    ResolveTransfer { tx_hash: B256 },
    /// Show one game
    Game { id: u64 },
    /// List all games
    Games,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("=== Dice Wagering Client ===");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  RPC: {}", config.eth_rpc_url);
    info!("  Dice: {}", config.dice_address);
    info!("  Event window: {} blocks", config.event_window_blocks);

    let ctx = ClientContext::connect(&config).await?;

    let mut options = ExecuteOptions::default();
    if let Some(secs) = cli.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    if let Some(blocks) = cli.window {
        options = options.with_event_window(blocks);
    }

    let dice = ctx.dice();
    let token = ctx.token();

    match cli.command {
        Command::Balance { owner } => {
            let balance = token.balance_of(owner.unwrap_or(ctx.signer())).await?;
            print_json(&balance)?;
        }
        Command::Info => print_json(&token.info().await?)?,
        Command::Approve { amount } => {
            print_json(&token.approve(dice.address(), amount.as_deref(), &options).await?)?
        }
        Command::Allowance { owner, spender } => {
            let allowance = token
                .allowance(
                    owner.unwrap_or(ctx.signer()),
                    spender.unwrap_or(dice.address()),
                )
                .await?;
            print_json(&allowance)?;
        }
        Command::Transfer { to, amount } => {
            print_json(&token.transfer(to, &amount, &options).await?)?
        }
        Command::TransferFrom { from, to, amount } => {
            print_json(&token.transfer_from(from, to, &amount, &options).await?)?
        }
        Command::Create { bet } => {
            let result = dice.create_game(&bet, &options).await?;
            info!("Game {} created at {}", result.game_id, result.creation_time_human());
            print_json(&result)?;
        }
        Command::Join { id } => print_json(&dice.join_game(id, &options).await?)?,
        Command::Play { id } => print_json(&dice.play_game(id, &options).await?)?,
        Command::Timeout { id } => print_json(&dice.timeout_game(id, &options).await?)?,
        Command::ResolveCreate { tx_hash } => {
            print_json(&dice.resolve_create(tx_hash, &options).await?)?
        }
        Command::ResolveJoin { tx_hash } => {
            print_json(&dice.resolve_join(tx_hash, &options).await?)?
        }
        Command::ResolvePlay { tx_hash } => {
            print_json(&dice.resolve_play(tx_hash, &options).await?)?
        }
        Command::ResolveTimeout { tx_hash } => {
            print_json(&dice.resolve_timeout(tx_hash, &options).await?)?
        }
        Command::ResolveTransfer { tx_hash } => {
            print_json(&token.resolve_transfer(tx_hash, &options).await?)?
        }
        Command::Game { id } => print_json(&dice.get_game(id).await?)?,
        Command::Games => print_json(&dice.get_games().await?)?,
    }

    Ok(())
}
