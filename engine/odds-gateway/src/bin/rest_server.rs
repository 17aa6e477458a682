//! NFL odds REST API server

use anyhow::Context;
use odds_gateway::logging::initialize_logging;
use odds_gateway::{GatewayConfig, OddsGateway};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    initialize_logging()?;

    let config_path = std::env::var("ODDS_GATEWAY_CONFIG").ok().map(PathBuf::from);
    let config =
        GatewayConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    info!(
        "Starting NFL odds gateway (api configured: {}, scrapers enabled: {})",
        config.odds.api_configured(),
        config.odds.scrapers.enabled
    );

    let gateway = OddsGateway::new(config).context("Failed to initialize odds gateway")?;
    gateway.run().await.context("Odds gateway stopped")?;

    Ok(())
}
