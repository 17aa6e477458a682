//! Gateway assembly: sources, cache, aggregator and HTTP server

use odds_engine::{OddsAggregator, OddsApiSource, OddsCache, OddsConfig, SystemClock};
use sportsbook_scraper::all_scrapers;
use std::sync::Arc;
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::rest_api::create_routes;

/// The OddsGateway server
pub struct OddsGateway {
    config: GatewayConfig,
    aggregator: Arc<OddsAggregator>,
}

impl OddsGateway {
    /// Wire the primary API source, the scraping fallbacks and the shared cache
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let aggregator = Arc::new(build_aggregator(&config.odds)?);
        Ok(Self { config, aggregator })
    }

    pub fn aggregator(&self) -> Arc<OddsAggregator> {
        self.aggregator.clone()
    }

    /// Serve until the process is stopped
    pub async fn run(self) -> GatewayResult<()> {
        let addr = self
            .config
            .server_addr()
            .map_err(|e| GatewayError::Config(format!("invalid server address: {}", e)))?;

        let routes = create_routes(self.aggregator.clone(), self.config.odds.api_configured());

        info!("Starting odds gateway on {}", addr);
        warp::serve(routes).run(addr).await;
        Ok(())
    }
}

/// Build the aggregator described by the odds configuration
pub fn build_aggregator(config: &OddsConfig) -> GatewayResult<OddsAggregator> {
    let timeout = config.upstream_timeout();
    let primary = OddsApiSource::new(config.odds_api.clone(), timeout)?;
    if !primary.is_configured() {
        info!("ODDS_API_KEY not set; odds will come from the scraping fallbacks only");
    }

    let cache = Arc::new(OddsCache::new(config.cache_config(), Arc::new(SystemClock)));
    let mut aggregator = OddsAggregator::new(Arc::new(primary), cache)
        .with_priority(config.priority()?)
        .with_upstream_timeout(timeout);

    if config.scrapers.enabled {
        for scraper in all_scrapers(&config.scrapers, timeout)? {
            aggregator = aggregator.with_fallback(Arc::new(scraper));
        }
    }

    info!(
        "Aggregator ready: cache ttl {:?}, fallbacks [{}]",
        aggregator.cache().ttl(),
        aggregator.fallback_names().join(", ")
    );
    Ok(aggregator)
}
