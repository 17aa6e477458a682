//! Primary source adapter backed by The Odds API (v4)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::OddsApiConfig;
use crate::error::{OddsError, OddsResult};
use crate::model::{League, MarketType};
use crate::raw::{OddsApiEvent, RawPayload};
use crate::source::SourceAdapter;

const SOURCE_NAME: &str = "the-odds-api";

/// The Odds API client
pub struct OddsApiSource {
    config: OddsApiConfig,
    client: Client,
}

impl OddsApiSource {
    /// Create a new adapter. `timeout` bounds every HTTP request.
    pub fn new(config: OddsApiConfig, timeout: Duration) -> OddsResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OddsError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn api_key(&self) -> OddsResult<&str> {
        self.config.api_key.as_deref().ok_or_else(|| {
            OddsError::unavailable(SOURCE_NAME, "no API key configured (set ODDS_API_KEY)")
        })
    }

    fn odds_url(&self, league: League) -> String {
        format!("{}/sports/{}/odds", self.config.base_url, league.sport_key())
    }

    /// Fetch odds for every upcoming event of a league
    pub async fn fetch_odds(&self, league: League) -> OddsResult<Vec<OddsApiEvent>> {
        let api_key = self.api_key()?;
        let url = self.odds_url(league);
        let markets: Vec<&str> = MarketType::ALL.iter().map(|m| m.as_str()).collect();
        let markets = markets.join(",");

        info!("Fetching {} odds from The Odds API", league.sport_key());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", api_key),
                ("regions", self.config.regions.as_str()),
                ("markets", markets.as_str()),
                ("oddsFormat", "american"),
                ("dateFormat", "iso"),
            ])
            .send()
            .await
            .map_err(|e| OddsError::unavailable(SOURCE_NAME, e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OddsError::unavailable(SOURCE_NAME, describe_status(status)));
        }

        let used = header_value(&response, "x-requests-used");
        let remaining = header_value(&response, "x-requests-remaining");
        info!("Odds API requests - used: {}, remaining: {}", used, remaining);
        if remaining == "0" {
            warn!("Odds API quota exhausted");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OddsError::unavailable(SOURCE_NAME, e.without_url()))?;
        let events = decode_events(&body)?;

        info!("Fetched {} events from The Odds API", events.len());
        Ok(events)
    }
}

#[async_trait]
impl SourceAdapter for OddsApiSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_raw(&self, league: League) -> OddsResult<RawPayload> {
        self.fetch_odds(league).await.map(RawPayload::OddsApi)
    }
}

/// Decode the response body event by event; an undecodable entry is skipped
fn decode_events(body: &[u8]) -> OddsResult<Vec<OddsApiEvent>> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| OddsError::malformed(SOURCE_NAME, e))?;

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping undecodable Odds API entry {}: {}", idx, e);
                None
            }
        })
        .collect())
}

fn describe_status(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("authentication rejected ({})", status)
        }
        StatusCode::TOO_MANY_REQUESTS => "request quota exceeded (429)".to_string(),
        other => format!("request failed with status {}", other),
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
