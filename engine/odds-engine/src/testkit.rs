//! Stub source adapters and fixtures for tests.
//!
//! Enabled for this crate's own tests and, through the `testkit` feature, for
//! dependent crates' dev builds.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{OddsError, OddsResult};
use crate::model::League;
use crate::price::PriceValue;
use crate::raw::{
    DraftKingsEvent, OddsApiBookmaker, OddsApiEvent, OddsApiMarket, OddsApiOutcome,
    RawPayload, ScrapedLines, ScrapedMoneyline,
};
use crate::source::SourceAdapter;

/// Always returns the same payload
pub struct StaticSource {
    name: String,
    payload: RawPayload,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, payload: RawPayload) -> Self {
        Self { name: name.into(), payload, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_raw(&self, _league: League) -> OddsResult<RawPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

/// Always fails with the configured error
pub struct FailingSource {
    name: String,
    error: OddsError,
    calls: AtomicUsize,
}

impl FailingSource {
    pub fn new(name: impl Into<String>, error: OddsError) -> Self {
        Self { name: name.into(), error, calls: AtomicUsize::new(0) }
    }

    pub fn unavailable(name: &str) -> Self {
        Self::new(name, OddsError::unavailable(name, "connection refused"))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_raw(&self, _league: League) -> OddsResult<RawPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Returns its payload after a delay; used to exercise upstream timeouts
pub struct SlowSource {
    name: String,
    delay: Duration,
    payload: RawPayload,
    calls: AtomicUsize,
}

impl SlowSource {
    pub fn new(name: impl Into<String>, delay: Duration, payload: RawPayload) -> Self {
        Self { name: name.into(), delay, payload, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for SlowSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_raw(&self, _league: League) -> OddsResult<RawPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.payload.clone())
    }
}

/// Builder for Odds API events
pub struct OddsApiEventBuilder {
    event: OddsApiEvent,
}

impl OddsApiEventBuilder {
    pub fn new(id: &str, home_team: &str, away_team: &str, commence_time: &str) -> Self {
        Self {
            event: OddsApiEvent {
                id: Some(id.to_string()),
                sport_key: Some(League::Nfl.sport_key().to_string()),
                commence_time: Some(commence_time.to_string()),
                home_team: Some(home_team.to_string()),
                away_team: Some(away_team.to_string()),
                bookmakers: Vec::new(),
            },
        }
    }

    pub fn moneyline(self, book: &str, home_price: i64, away_price: i64) -> Self {
        let home = self.home();
        let away = self.away();
        self.market(
            book,
            "h2h",
            vec![outcome(&home, home_price, None), outcome(&away, away_price, None)],
        )
    }

    /// Spread from the home side; the away point mirrors it
    pub fn spread(self, book: &str, home_point: f64, home_price: i64, away_price: i64) -> Self {
        let home = self.home();
        let away = self.away();
        self.market(
            book,
            "spreads",
            vec![
                outcome(&home, home_price, Some(home_point)),
                outcome(&away, away_price, Some(-home_point)),
            ],
        )
    }

    pub fn total(self, book: &str, point: f64, over_price: i64, under_price: i64) -> Self {
        self.market(
            book,
            "totals",
            vec![outcome("Over", over_price, Some(point)), outcome("Under", under_price, Some(point))],
        )
    }

    pub fn build(self) -> OddsApiEvent {
        self.event
    }

    fn home(&self) -> String {
        self.event.home_team.clone().unwrap_or_default()
    }

    fn away(&self) -> String {
        self.event.away_team.clone().unwrap_or_default()
    }

    fn market(mut self, book: &str, key: &str, outcomes: Vec<OddsApiOutcome>) -> Self {
        let market = OddsApiMarket { key: Some(key.to_string()), outcomes };
        match self.event.bookmakers.iter_mut().find(|b| b.key.as_deref() == Some(book)) {
            Some(existing) => existing.markets.push(market),
            None => self.event.bookmakers.push(OddsApiBookmaker {
                key: Some(book.to_string()),
                title: None,
                last_update: Some("2025-09-04T18:00:00Z".to_string()),
                markets: vec![market],
            }),
        }
        self
    }
}

fn outcome(name: &str, price: i64, point: Option<f64>) -> OddsApiOutcome {
    OddsApiOutcome {
        name: Some(name.to_string()),
        price: Some(PriceValue::Integer(price)),
        point: point.map(PriceValue::Decimal),
    }
}

/// Chiefs vs Ravens with DraftKings (Chiefs -140) and FanDuel (Chiefs -120)
pub fn chiefs_ravens_event() -> OddsApiEvent {
    OddsApiEventBuilder::new(
        "evt-kc-bal",
        "Kansas City Chiefs",
        "Baltimore Ravens",
        "2025-09-05T00:20:00Z",
    )
    .moneyline("draftkings", -140, 120)
    .spread("draftkings", -3.0, -110, -110)
    .total("draftkings", 47.5, -110, -110)
    .moneyline("fanduel", -120, 100)
    .spread("fanduel", -3.0, -105, -115)
    .total("fanduel", 46.5, -108, -112)
    .build()
}

pub fn chiefs_ravens_payload() -> RawPayload {
    RawPayload::OddsApi(vec![chiefs_ravens_event()])
}

/// The same matchup as scraped from DraftKings, moneyline only
pub fn scraped_draftkings_event() -> DraftKingsEvent {
    DraftKingsEvent {
        event_id: Some(serde_json::json!("dk-31245")),
        team_name1: Some("Baltimore Ravens".to_string()),
        team_name2: Some("Kansas City Chiefs".to_string()),
        start_date: Some("2025-09-05T00:20:00Z".to_string()),
        lines: ScrapedLines {
            moneyline: Some(ScrapedMoneyline {
                away: Some(PriceValue::Text("+115".to_string())),
                home: Some(PriceValue::Integer(-135)),
            }),
            ..ScrapedLines::default()
        },
    }
}
