//! Odds aggregation: cache, primary source, scraping fallbacks

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::cache::OddsCache;
use crate::comparison::{best_odds, ComparisonResult};
use crate::error::{OddsError, OddsResult};
use crate::model::{Bookmaker, Game, League};
use crate::normalizer::normalize;
use crate::signature::QuerySignature;
use crate::source::SourceAdapter;
use crate::sportsbooks::BookPriority;

const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates cache lookups and source adapters for one league
pub struct OddsAggregator {
    primary: Arc<dyn SourceAdapter>,
    fallbacks: Vec<Arc<dyn SourceAdapter>>,
    cache: Arc<OddsCache>,
    priority: BookPriority,
    league: League,
    upstream_timeout: Duration,
}

impl OddsAggregator {
    pub fn new(primary: Arc<dyn SourceAdapter>, cache: Arc<OddsCache>) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
            cache,
            priority: BookPriority::default(),
            league: League::Nfl,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Register a fallback adapter. Registration order is merge order.
    pub fn with_fallback(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.fallbacks.push(adapter);
        self
    }

    pub fn with_priority(mut self, priority: BookPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    pub fn priority(&self) -> &BookPriority {
        &self.priority
    }

    pub fn cache(&self) -> &OddsCache {
        &self.cache
    }

    pub fn fallback_names(&self) -> Vec<&str> {
        self.fallbacks.iter().map(|f| f.name()).collect()
    }

    /// Games matching the query, served from cache when fresh.
    ///
    /// Fails with `NoOddsAvailable` only when every source failed; nothing is
    /// cached in that case.
    pub async fn get_odds(&self, query: &QuerySignature) -> OddsResult<Vec<Game>> {
        if let Some(games) = self.cache.get(query) {
            debug!("Serving {} cached games for {}", games.len(), query);
            return Ok(games);
        }

        // a filtered view is derived from a fresh unfiltered entry and not
        // stored, so it never outlives the data it came from
        if !query.is_unfiltered() {
            if let Some(games) = self.cache.get(&QuerySignature::all()) {
                debug!("Filtering {} cached games for {}", games.len(), query);
                return Ok(filter_games(games, query));
            }
        }

        let games = match self.fetch_source(self.primary.as_ref()).await {
            Ok(games) => games,
            Err(e) => {
                warn!("Primary source {} failed: {}", self.primary.name(), e);
                self.fetch_fallbacks().await.ok_or_else(|| {
                    error!("All odds sources failed for {}", query);
                    OddsError::NoOddsAvailable
                })?
            }
        };

        if !query.is_unfiltered() {
            self.cache.put(QuerySignature::all(), games.clone());
        }
        let games = filter_games(games, query);
        self.cache.put(query.clone(), games.clone());
        info!("Cached {} games for {}", games.len(), query);
        Ok(games)
    }

    /// One game by id, looked up in the unfiltered odds set
    pub async fn get_event(&self, event_id: &str) -> OddsResult<Game> {
        self.all_games()
            .await?
            .into_iter()
            .find(|g| g.id == event_id)
            .ok_or_else(|| OddsError::NotFound(format!("event '{}' not found", event_id)))
    }

    /// First game whose home team matches, else whose away team matches
    pub async fn find_game(&self, home_team: Option<&str>, away_team: Option<&str>) -> OddsResult<Game> {
        let home = home_team.map(str::trim).filter(|s| !s.is_empty());
        let away = away_team.map(str::trim).filter(|s| !s.is_empty());
        if home.is_none() && away.is_none() {
            return Err(OddsError::InvalidQuery(
                "home_team or away_team is required".to_string(),
            ));
        }

        let games = self.all_games().await?;
        let by_home = home.and_then(|name| {
            games.iter().find(|g| g.home_team.eq_ignore_ascii_case(name))
        });
        let found = by_home.or_else(|| {
            away.and_then(|name| games.iter().find(|g| g.away_team.eq_ignore_ascii_case(name)))
        });

        found.cloned().ok_or_else(|| {
            OddsError::NotFound(format!(
                "no game for home_team={} away_team={}",
                home.unwrap_or("-"),
                away.unwrap_or("-")
            ))
        })
    }

    /// Best available prices for the matching game
    pub async fn compare(
        &self,
        home_team: Option<&str>,
        away_team: Option<&str>,
    ) -> OddsResult<ComparisonResult> {
        let game = self.find_game(home_team, away_team).await?;
        Ok(best_odds(&game, &self.priority))
    }

    /// Run one fallback adapter directly, bypassing the cache
    pub async fn scrape_source(&self, name: &str) -> OddsResult<Vec<Game>> {
        let adapter = self
            .fallbacks
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| OddsError::InvalidQuery(format!("unsupported sportsbook '{}'", name)))?;
        self.fetch_source(adapter.as_ref()).await
    }

    async fn all_games(&self) -> OddsResult<Vec<Game>> {
        match self.get_odds(&QuerySignature::all()).await {
            Err(OddsError::NoOddsAvailable) => Ok(Vec::new()),
            other => other,
        }
    }

    async fn fetch_source(&self, adapter: &dyn SourceAdapter) -> OddsResult<Vec<Game>> {
        info!("Fetching {} odds from {}", self.league.sport_key(), adapter.name());

        let raw = tokio::time::timeout(self.upstream_timeout, adapter.fetch_raw(self.league))
            .await
            .map_err(|_| {
                OddsError::unavailable(
                    adapter.name(),
                    format!("timed out after {:?}", self.upstream_timeout),
                )
            })??;

        let games = normalize(&raw)?;
        info!("{} returned {} games", adapter.name(), games.len());
        Ok(games)
    }

    /// Run every fallback concurrently; `None` when all of them failed
    async fn fetch_fallbacks(&self) -> Option<Vec<Game>> {
        if self.fallbacks.is_empty() {
            return None;
        }

        let results =
            join_all(self.fallbacks.iter().map(|f| self.fetch_source(f.as_ref()))).await;

        let mut batches = Vec::new();
        for (adapter, result) in self.fallbacks.iter().zip(results) {
            match result {
                Ok(games) => batches.push(games),
                Err(e) => warn!("Fallback source {} failed: {}", adapter.name(), e),
            }
        }

        if batches.is_empty() {
            None
        } else {
            Some(merge_games(batches))
        }
    }
}

/// Merge per-source game lists by matchup. Earlier batches win id and kickoff.
pub fn merge_games(batches: Vec<Vec<Game>>) -> Vec<Game> {
    let mut merged: Vec<Game> = Vec::new();
    let mut index: HashMap<(String, String, chrono::NaiveDate), usize> = HashMap::new();

    for game in batches.into_iter().flatten() {
        let key = game.matchup_key();
        match index.get(&key).copied() {
            Some(idx) => {
                let existing = &merged[idx];
                let mut bookmakers = existing.bookmakers.clone();
                for book in game.bookmakers {
                    if existing.bookmaker(&book.key).is_none() {
                        bookmakers.push(book);
                    }
                }
                merged[idx] = existing.with_bookmakers(bookmakers);
            }
            None => {
                index.insert(key, merged.len());
                merged.push(game);
            }
        }
    }

    merged
}

/// Restrict games to the requested markets and bookmakers.
///
/// Bookmakers left without markets are dropped; games are kept even with no
/// bookmakers.
pub fn filter_games(games: Vec<Game>, query: &QuerySignature) -> Vec<Game> {
    if query.is_unfiltered() {
        return games;
    }

    games
        .into_iter()
        .map(|game| {
            let bookmakers: Vec<Bookmaker> = game
                .bookmakers
                .iter()
                .filter(|b| query.includes_bookmaker(&b.key))
                .filter_map(|b| {
                    let mut book = b.clone();
                    book.markets.retain(|market_type, _| query.includes_market(*market_type));
                    (!book.markets.is_empty()).then_some(book)
                })
                .collect();
            game.with_bookmakers(bookmakers)
        })
        .collect()
}
