//! Odds engine settings with serde defaults and environment overrides

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::{OddsError, OddsResult};
use crate::sportsbooks::BookPriority;

/// Configuration for the odds engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OddsConfig {
    /// The Odds API configuration
    pub odds_api: OddsApiConfig,

    /// Cache configuration
    pub cache: CacheSettings,

    /// Upstream call limits
    pub upstream: UpstreamConfig,

    /// Scraping fallback configuration
    pub scrapers: ScraperSettings,

    /// Bookmaker keys in tie-break order (empty = catalog order)
    pub bookmaker_priority: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsApiConfig {
    /// API key; the primary adapter reports unavailable without one
    pub api_key: Option<String>,

    /// Base URL of the v4 API
    pub base_url: String,

    /// Bookmaker regions to request
    pub regions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Entry lifetime in seconds
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Bound on each source adapter call, in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    /// Register the sportsbook scrapers as fallback sources
    pub enabled: bool,

    /// User agent sent to sportsbook sites
    pub user_agent: String,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            regions: "us".to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { duration_secs: 300 }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl OddsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> OddsResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Override fields from a variable lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> OddsResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ODDS_API_KEY") {
            let key = key.trim().to_string();
            self.odds_api.api_key = (!key.is_empty()).then_some(key);
        }

        if let Some(url) = lookup("ODDS_API_BASE_URL") {
            self.odds_api.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(regions) = lookup("ODDS_API_REGIONS") {
            self.odds_api.regions = regions.trim().to_ascii_lowercase();
        }

        if let Some(secs) = parse_var(&lookup, "CACHE_DURATION")? {
            self.cache.duration_secs = secs;
        }

        if let Some(secs) = parse_var(&lookup, "UPSTREAM_TIMEOUT_SECS")? {
            self.upstream.timeout_secs = secs;
        }

        if let Some(enabled) = lookup("SCRAPERS_ENABLED") {
            self.scrapers.enabled = parse_bool("SCRAPERS_ENABLED", &enabled)?;
        }

        if let Some(priority) = lookup("BOOKMAKER_PRIORITY") {
            self.bookmaker_priority = priority
                .split(',')
                .map(|k| k.trim().to_ascii_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }

        Ok(())
    }

    pub fn validate(&self) -> OddsResult<()> {
        if self.upstream.timeout_secs == 0 {
            return Err(OddsError::Config("upstream timeout must be positive".to_string()));
        }
        if self.odds_api.base_url.is_empty() {
            return Err(OddsError::Config("odds api base url is empty".to_string()));
        }
        self.priority()?;
        Ok(())
    }

    pub fn api_configured(&self) -> bool {
        self.odds_api.api_key.is_some()
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig { ttl: Duration::from_secs(self.cache.duration_secs) }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }

    pub fn priority(&self) -> OddsResult<BookPriority> {
        if self.bookmaker_priority.is_empty() {
            Ok(BookPriority::default())
        } else {
            BookPriority::new(&self.bookmaker_priority)
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> OddsResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| OddsError::Config(format!("{} has invalid value '{}'", name, raw))),
    }
}

fn parse_bool(name: &str, raw: &str) -> OddsResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(OddsError::Config(format!("{} has invalid value '{}'", name, raw))),
    }
}
