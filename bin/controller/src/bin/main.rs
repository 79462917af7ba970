//! Watch a pegged token contract.
//!
//! Connects an account (a watch-only address or the `PRIVATE_KEY` signer),
//! keeps the contract snapshot current and logs it every time a refresh
//! settles.

use clap::Parser;
use client::{ContractClient, TokenClient};
use controller::{
    config::Config, metrics::install_prometheus_exporter, report, verify_abi, Controller,
};
use session::{LocalWallet, StaticAccount};
use snapshot::resolve;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "controller")]
#[command(about = "Watch a pegged token contract")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Watch-only account to resolve the role of
    #[arg(short, long)]
    account: Option<String>,

    /// Private key whose address is watched when no account is given
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting controller");

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    info!("Loaded config:");
    info!("  RPC URL: {}", config.rpc_url);
    info!("  Token: {}", config.token_address);
    info!("  Poll interval: {}s", config.poll_interval_secs);

    if let Some(path) = &config.abi_path {
        verify_abi(path)?;
    }

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }

    let provider = client::create_provider(&config.rpc_url)?;
    let token = Arc::new(TokenClient::new(provider, config.token_address));

    match token.decimals().await {
        Ok(decimals) if decimals != config.units.token_decimals => warn!(
            onchain = decimals,
            configured = config.units.token_decimals,
            "Token decimals differ from the configured units"
        ),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Could not read token decimals"),
    }

    let controller = Controller::new(token, config.units)
        .with_retry(config.retry.into())
        .with_list_separator(config.list_separator.clone());

    if let Some(account) = &cli.account {
        let account = validation::validate_address(account)?;
        controller.connect(&StaticAccount(account)).await?;
    } else if let Some(private_key) = &cli.private_key {
        controller
            .connect(&LocalWallet::from_private_key(private_key)?)
            .await?;
    } else {
        info!("No account given, watching contract-wide state only");
    }

    let mut updates = controller.aggregator().subscribe();
    let log_snapshots = async {
        let mut reported = 0;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if !snapshot.is_settled() || snapshot.generation() == reported {
                continue;
            }
            reported = snapshot.generation();

            let account = controller.session().account();
            let role = resolve(account, &snapshot);
            info!(
                "Snapshot:\n{}",
                report::render(&snapshot, account, role, controller.units())
            );
        }
    };

    tokio::select! {
        _ = controller.run(config.poll_interval()) => {}
        _ = log_snapshots => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutting down");
        }
    }

    Ok(())
}
