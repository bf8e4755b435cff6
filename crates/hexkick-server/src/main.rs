//! Hexkick multiplayer session server.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod hub;
mod protocol;
mod server;
mod session;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        subscriber_buffer = config.subscriber_buffer,
        "Starting Hexkick server..."
    );

    let state = Arc::new(ServerState::new(config.subscriber_buffer));

    server::run_server(config.addr, state).await
}
