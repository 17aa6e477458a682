//! OddsGateway - REST API for aggregated NFL odds
//!
//! Serves the odds engine over HTTP: game odds with market/bookmaker filters,
//! single-event lookup, best-line comparison, the sportsbook catalog and
//! direct scraping of one book.

pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod rest_api;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::OddsGateway;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;
