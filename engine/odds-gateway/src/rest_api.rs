//! REST API endpoints for the OddsGateway
//!
//! All bodies are JSON. Total upstream failure is not an error here: the odds
//! endpoint answers 200 with an empty game list.

use odds_engine::sportsbooks::SPORTSBOOKS;
use odds_engine::{Game, OddsAggregator, OddsError, QuerySignature};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use warp::Filter;

use crate::error::{handle_rejection, reject};

/// Odds query parameters
#[derive(Debug, Default, Deserialize)]
pub struct OddsParams {
    /// Comma separated market keys
    pub markets: Option<String>,
    /// Comma separated bookmaker keys
    pub bookmakers: Option<String>,
}

/// Comparison query parameters
#[derive(Debug, Default, Deserialize)]
pub struct CompareParams {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
}

/// Odds list response
#[derive(Debug, Serialize)]
pub struct OddsResponse {
    pub games: Vec<Game>,
    pub count: usize,
    pub timestamp: String,
}

/// Direct scrape response
#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub sportsbook: String,
    pub games: Vec<Game>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn api_info() -> impl warp::Reply {
    warp::reply::json(&serde_json::json!({
        "name": "Avantus Analytics - NFL Odds API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Real-time NFL odds from popular sportsbooks",
        "endpoints": {
            "/api/odds/nfl": "Get all NFL game odds",
            "/api/odds/nfl/<event_id>": "Get specific game odds",
            "/api/odds/compare": "Compare odds across sportsbooks",
            "/api/sportsbooks": "List available sportsbooks",
            "/api/scrape/<sportsbook>": "Scrape one sportsbook directly",
            "/api/health": "API health check"
        }
    }))
}

fn health_status(api_configured: bool) -> impl warp::Reply {
    let message = if api_configured {
        "API is running"
    } else {
        "API key not configured - set ODDS_API_KEY"
    };
    warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "api_configured": api_configured,
        "message": message,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn get_nfl_odds(
    params: OddsParams,
    aggregator: Arc<OddsAggregator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let query = QuerySignature::parse(params.markets.as_deref(), params.bookmakers.as_deref())
        .map_err(reject)?;

    let games = match aggregator.get_odds(&query).await {
        Ok(games) => games,
        Err(OddsError::NoOddsAvailable) => {
            warn!("No odds available for {}; returning empty result", query);
            Vec::new()
        }
        Err(e) => return Err(reject(e)),
    };

    Ok(warp::reply::json(&OddsResponse {
        count: games.len(),
        games,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

async fn get_event_odds(
    event_id: String,
    aggregator: Arc<OddsAggregator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let game = aggregator.get_event(&event_id).await.map_err(reject)?;
    Ok(warp::reply::json(&game))
}

async fn compare_odds(
    params: CompareParams,
    aggregator: Arc<OddsAggregator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let comparison = aggregator
        .compare(params.home_team.as_deref(), params.away_team.as_deref())
        .await
        .map_err(reject)?;
    Ok(warp::reply::json(&comparison))
}

fn list_sportsbooks() -> impl warp::Reply {
    warp::reply::json(&serde_json::json!({
        "sportsbooks": SPORTSBOOKS,
        "count": SPORTSBOOKS.len()
    }))
}

async fn scrape_sportsbook(
    book: String,
    aggregator: Arc<OddsAggregator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let sportsbook = book.to_ascii_lowercase();
    let response = match aggregator.scrape_source(&sportsbook).await {
        Ok(games) => ScrapeResponse { sportsbook, count: games.len(), games, error: None },
        Err(e @ OddsError::InvalidQuery(_)) => return Err(reject(e)),
        Err(e) => {
            warn!("Direct scrape of {} failed: {}", sportsbook, e);
            ScrapeResponse { sportsbook, games: Vec::new(), count: 0, error: Some(e.to_string()) }
        }
    };
    Ok(warp::reply::json(&response))
}

/// Create REST API routes
pub fn create_routes(
    aggregator: Arc<OddsAggregator>,
    api_configured: bool,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let aggregator_filter = warp::any().map(move || aggregator.clone());

    // API information
    let index = warp::path::end().and(warp::get()).map(api_info);

    // Health check endpoint
    let health = warp::path("api")
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(warp::get())
        .map(move || health_status(api_configured));

    // NFL odds endpoint
    let nfl_odds = warp::path("api")
        .and(warp::path("odds"))
        .and(warp::path("nfl"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<OddsParams>())
        .and(aggregator_filter.clone())
        .and_then(get_nfl_odds);

    // Single event endpoint
    let event_odds = warp::path("api")
        .and(warp::path("odds"))
        .and(warp::path("nfl"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(aggregator_filter.clone())
        .and_then(get_event_odds);

    // Best line comparison endpoint
    let compare = warp::path("api")
        .and(warp::path("odds"))
        .and(warp::path("compare"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<CompareParams>())
        .and(aggregator_filter.clone())
        .and_then(compare_odds);

    // Sportsbook catalog endpoint
    let sportsbooks = warp::path("api")
        .and(warp::path("sportsbooks"))
        .and(warp::path::end())
        .and(warp::get())
        .map(list_sportsbooks);

    // Direct scrape endpoint
    let scrape = warp::path("api")
        .and(warp::path("scrape"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(aggregator_filter)
        .and_then(scrape_sportsbook);

    // Combine all routes
    index
        .or(health)
        .or(nfl_odds)
        .or(event_odds)
        .or(compare)
        .or(sportsbooks)
        .or(scrape)
        .recover(handle_rejection)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "OPTIONS"]),
        )
}
