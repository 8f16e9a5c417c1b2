//! timebroker server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timebroker::Broker;
use timebroker::api::create_routes;
use timebroker::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timebroker=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let broker = Arc::new(Broker::new());
    let app = create_routes().with_state(broker);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!(%addr, "timebroker listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
