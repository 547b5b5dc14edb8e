//! Lockyard server binary
//!
//! Serves the HTTP API the frontend drives. Node URL and locker contract
//! can be set up front via environment or reconfigured at runtime through
//! `POST /node/config`.

use lockyard_api::{start_server, AppState};
use lockyard_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lockyard=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    tracing::info!("Starting Lockyard");

    let mut config = AppConfig::default();
    if let Ok(url) = std::env::var("LOCKYARD_RPC_URL") {
        config.rpc.url = url;
    }
    if let Ok(locker) = std::env::var("LOCKYARD_LOCKER_ADDRESS") {
        config.locker_address = locker;
    }
    if let Ok(port) = std::env::var("LOCKYARD_API_PORT") {
        config.api_port = port.parse()?;
    }

    let port = config.api_port;
    let state = AppState::with_config(config);

    start_server(state, port).await?;

    Ok(())
}
