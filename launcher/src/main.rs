//! Mintforge Launcher binary.
//!
//! Reads the configuration from the environment and runs one action:
//! `LAUNCH_ACTION=estimate | market | token | accounts`. Market and token
//! requests are read as JSON from the file named by `LAUNCH_REQUEST`.

use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use mintforge_launcher::{LauncherConfig, Launcher};
use mintforge_sdk::{
    KeypairWallet, MarketCreationRequest, QueueLengths, SolanaRpcClient, TokenCreationRequest,
};
use serde::de::DeserializeOwned;
use tokio_stream::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mintforge_launcher=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = LauncherConfig::from_env().context("invalid launcher configuration")?;
    let action = env::var("LAUNCH_ACTION").unwrap_or_else(|_| "estimate".to_string());

    tracing::info!("Starting Mintforge Launcher");
    tracing::info!("Cluster: {}", config.cluster);
    tracing::info!("RPC URL: {}", config.rpc_endpoint());
    tracing::info!("Action: {}", action);

    let keypair_path = config
        .keypair_path
        .clone()
        .context("SOLANA_KEYPAIR_PATH must be set")?;
    let wallet = KeypairWallet::from_file(&keypair_path)
        .with_context(|| format!("failed to load keypair from {}", keypair_path))?;
    let connection = SolanaRpcClient::new(config.rpc_client_config())?;

    let launcher = Launcher::new(Arc::new(connection), Arc::new(wallet), config)?;

    let mut events = launcher.subscribe();
    let cluster = launcher.config().cluster.clone();
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match &event.status {
                mintforge_launcher::StepStatus::Confirmed { signature, .. } => tracing::info!(
                    "[{}/{}] {} {}",
                    event.index + 1,
                    event.total,
                    event.message(),
                    cluster.explorer_tx_url(signature)
                ),
                _ => tracing::info!("[{}/{}] {}", event.index + 1, event.total, event.message()),
            }
        }
    });

    match action.as_str() {
        "estimate" => {
            let create_mints = env::var("LAUNCH_CREATE_MINTS").is_ok_and(|v| v == "true");
            let lengths = match env::var("LAUNCH_REQUEST") {
                Ok(path) => read_json::<QueueLengths>(&path)?,
                Err(_) => QueueLengths::default(),
            };
            let estimate = launcher.estimate_market_costs(lengths, create_mints).await?;
            tracing::info!("Estimated cost: {} SOL", estimate.total_sol());
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }
        "market" => {
            let request: MarketCreationRequest = read_json(&request_path()?)?;
            let created = launcher.create_market(&request).await?;
            tracing::info!("Market created: {}", created.market);
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        "token" => {
            let request: TokenCreationRequest = read_json(&request_path()?)?;
            let created = launcher.create_token(&request).await?;
            tracing::info!("Token created: {}", created.mint);
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        "accounts" => {
            let accounts = launcher.token_accounts().await?;
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
        other => bail!("unknown LAUNCH_ACTION: {}", other),
    }

    let snapshot = launcher.metrics().snapshot();
    tracing::info!(
        "Submitted {} transactions, {} confirmed",
        snapshot.transactions_submitted,
        snapshot.transactions_confirmed
    );

    drop(launcher);
    reporter.await?;

    tracing::info!("Shutting down launcher");

    Ok(())
}

fn request_path() -> anyhow::Result<String> {
    env::var("LAUNCH_REQUEST").context("LAUNCH_REQUEST must name a JSON request file")
}

fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
