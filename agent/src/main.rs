//! timebroker-agent entry point

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use timebroker_agent::cli::Cli;
use timebroker_agent::poller::{self, BrokerClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timebroker_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // The broker keys everything on this self-generated ID.
    let client_id = Uuid::now_v7().to_string();

    let client = BrokerClient::new(&cli.host, cli.port, &client_id)
        .context("Failed to configure broker client")?;

    info!(%client_id, host = %cli.host, port = cli.port, "agent running");
    info!("a GET request to {} reports this client's system time", client.query_url());

    poller::run(&client).await;

    Ok(())
}
