//! CLI tool to read the contract state and send single write actions.
//!
//! Each subcommand refreshes the snapshot for the signer, submits one
//! transaction and prints its outcome.

use action::{DispatchError, Outcome, PendingTransaction};
use clap::{Parser, Subcommand};
use client::TokenClient;
use controller::{config::Config, report, Controller};
use session::LocalWallet;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "tx")]
#[command(about = "Read the token state or send a single write action")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the snapshot and the role of the signer
    Status,

    /// Mint tokens to the signer
    Mint { amount: String },

    /// Burn tokens held by the signer
    Burn { amount: String },

    /// Approve a spender
    Approve { spender: String, amount: String },

    /// Send `amount` tokens to every address in the list
    Airdrop { recipients: String, amount: String },

    /// Add an account to the whitelist
    Whitelist {
        account: String,
        /// Remove instead of add
        #[arg(long)]
        remove: bool,
    },

    /// Grant admin rights
    Admin {
        account: String,
        /// Revoke instead of grant
        #[arg(long)]
        remove: bool,
    },

    /// Set the transfer tax
    SetTax { tax: String },

    /// Set the tax receiver
    SetTaxReceiver { receiver: String },

    /// Set the swap rate
    SetRate { rate: String },

    /// Swap native currency for tokens
    GetToken { value: String },

    /// Swap tokens for native currency
    GetEth { amount: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    let provider = client::create_wallet_provider(&config.rpc_url, &cli.private_key)?;
    let token = Arc::new(TokenClient::new(provider, config.token_address));
    let controller = Controller::new(token, config.units)
        .with_retry(config.retry.into())
        .with_list_separator(config.list_separator.clone());

    let account = controller
        .connect(&LocalWallet::from_private_key(&cli.private_key)?)
        .await?;
    let snapshot = controller.refresh().await;
    let role = controller.role();

    info!(account = %account, role = %role, "Connected");

    let result = match cli.command {
        Command::Status => {
            println!(
                "{}",
                report::render(&snapshot, Some(account), role, controller.units())
            );
            return Ok(());
        }
        Command::Mint { amount } => controller.mint(&amount).await,
        Command::Burn { amount } => controller.burn(&amount).await,
        Command::Approve { spender, amount } => controller.approve(&spender, &amount).await,
        Command::Airdrop { recipients, amount } => {
            controller.airdrop(&recipients, &amount).await
        }
        Command::Whitelist { account, remove } => {
            controller.set_whitelist(&account, !remove).await
        }
        Command::Admin { account, remove } => controller.set_admin(&account, !remove).await,
        Command::SetTax { tax } => controller.set_tax(&tax).await,
        Command::SetTaxReceiver { receiver } => controller.set_tax_receiver(&receiver).await,
        Command::SetRate { rate } => controller.set_rate(&rate).await,
        Command::GetToken { value } => controller.get_token(&value).await,
        Command::GetEth { amount } => controller.get_eth(&amount).await,
    };

    report_outcome(result)
}

fn report_outcome(result: Result<PendingTransaction, DispatchError>) -> eyre::Result<()> {
    let record = result?;

    match record.outcome {
        Outcome::Succeeded(receipt) => {
            info!(
                action = %record.kind,
                tx_hash = %receipt.tx_hash,
                block_number = receipt.block_number,
                gas_used = receipt.gas_used,
                "{}",
                record.description
            );
            Ok(())
        }
        Outcome::Failed(reason) => {
            eyre::bail!("{} failed: {reason}", record.description)
        }
        Outcome::Abandoned => eyre::bail!(
            "{} was abandoned, check the chain before resubmitting",
            record.description
        ),
        Outcome::InFlight => eyre::bail!("{} did not complete", record.description),
    }
}
