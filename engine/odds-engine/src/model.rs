//! Unified odds schema shared by every provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::OddsError;

/// American odds price (e.g. -110, +150)
pub type AmericanOdds = i32;

/// League served by the source adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nfl,
}

impl League {
    /// Sport key used by The Odds API
    pub fn sport_key(&self) -> &'static str {
        match self {
            League::Nfl => "americanfootball_nfl",
        }
    }
}

/// Market type a bookmaker can offer on a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Moneyline
    H2h,
    Spreads,
    Totals,
}

impl MarketType {
    pub const ALL: [MarketType; 3] = [MarketType::H2h, MarketType::Spreads, MarketType::Totals];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::H2h => "h2h",
            MarketType::Spreads => "spreads",
            MarketType::Totals => "totals",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h2h" | "moneyline" => Ok(MarketType::H2h),
            "spreads" | "spread" => Ok(MarketType::Spreads),
            "totals" | "total" => Ok(MarketType::Totals),
            other => Err(OddsError::InvalidQuery(format!("unknown market '{}'", other))),
        }
    }
}

/// Side of a totals market
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalSide {
    Over,
    Under,
}

impl TotalSide {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "over" | "o" => Some(TotalSide::Over),
            "under" | "u" => Some(TotalSide::Under),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TotalSide::Over => "over",
            TotalSide::Under => "under",
        }
    }
}

/// A price attached to a point value (spread handicap or total)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub point: f64,
    pub price: AmericanOdds,
}

/// One market offered by a bookmaker.
///
/// Serialized untagged: the enclosing market map key already names the type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Market {
    /// Team name -> price
    Moneyline(BTreeMap<String, AmericanOdds>),
    /// Team name -> handicap line
    Spread(BTreeMap<String, Line>),
    /// Over/under -> total line
    Total(BTreeMap<TotalSide, Line>),
}

impl Market {
    pub fn market_type(&self) -> MarketType {
        match self {
            Market::Moneyline(_) => MarketType::H2h,
            Market::Spread(_) => MarketType::Spreads,
            Market::Total(_) => MarketType::Totals,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Market::Moneyline(prices) => prices.is_empty(),
            Market::Spread(lines) => lines.is_empty(),
            Market::Total(lines) => lines.is_empty(),
        }
    }
}

/// A sportsbook's offers on one game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bookmaker {
    /// Short identifier, unique within a game (e.g. "draftkings")
    pub key: String,
    /// Display name (e.g. "DraftKings")
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    pub markets: BTreeMap<MarketType, Market>,
}

impl Bookmaker {
    pub fn market(&self, market_type: MarketType) -> Option<&Market> {
        self.markets.get(&market_type)
    }

    pub fn moneyline(&self) -> Option<&BTreeMap<String, AmericanOdds>> {
        match self.markets.get(&MarketType::H2h) {
            Some(Market::Moneyline(prices)) => Some(prices),
            _ => None,
        }
    }

    pub fn spreads(&self) -> Option<&BTreeMap<String, Line>> {
        match self.markets.get(&MarketType::Spreads) {
            Some(Market::Spread(lines)) => Some(lines),
            _ => None,
        }
    }

    pub fn totals(&self) -> Option<&BTreeMap<TotalSide, Line>> {
        match self.markets.get(&MarketType::Totals) {
            Some(Market::Total(lines)) => Some(lines),
            _ => None,
        }
    }
}

/// A single NFL event with every bookmaker's offers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub bookmakers: Vec<Bookmaker>,
    /// False when no bookmaker currently posts a market on this game
    pub has_offers: bool,
}

impl Game {
    pub fn new(
        id: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        commence_time: DateTime<Utc>,
        bookmakers: Vec<Bookmaker>,
    ) -> Self {
        let has_offers = bookmakers.iter().any(|b| !b.markets.is_empty());
        Self {
            id: id.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            commence_time,
            bookmakers,
            has_offers,
        }
    }

    /// Copy of this game with a different bookmaker list
    pub fn with_bookmakers(&self, bookmakers: Vec<Bookmaker>) -> Self {
        Game::new(
            self.id.clone(),
            self.home_team.clone(),
            self.away_team.clone(),
            self.commence_time,
            bookmakers,
        )
    }

    pub fn bookmaker(&self, key: &str) -> Option<&Bookmaker> {
        self.bookmakers.iter().find(|b| b.key == key)
    }

    /// Case-insensitive identity of the matchup, used to merge games across sources
    pub fn matchup_key(&self) -> (String, String, chrono::NaiveDate) {
        (
            self.home_team.trim().to_lowercase(),
            self.away_team.trim().to_lowercase(),
            self.commence_time.date_naive(),
        )
    }
}
