//! Odds Engine - NFL odds normalization, caching and comparison
//!
//! This crate turns provider-specific odds payloads (The Odds API, scraped
//! sportsbook pages) into one unified game schema, caches results per query,
//! falls back to scraping adapters when the primary API is down, and finds the
//! best available price per side.

pub mod aggregator;
pub mod cache;
pub mod clock;
pub mod comparison;
pub mod config;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod odds_api;
pub mod price;
pub mod raw;
pub mod signature;
pub mod source;
pub mod sportsbooks;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use aggregator::OddsAggregator;
pub use cache::{CacheConfig, OddsCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use comparison::{best_odds, ComparisonResult};
pub use config::OddsConfig;
pub use error::{OddsError, OddsResult};
pub use model::{Bookmaker, Game, League, Line, Market, MarketType, TotalSide};
pub use normalizer::normalize;
pub use odds_api::OddsApiSource;
pub use raw::RawPayload;
pub use signature::QuerySignature;
pub use source::SourceAdapter;
pub use sportsbooks::{BookPriority, SportsbookInfo, SPORTSBOOKS};

/// Version of the odds engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
