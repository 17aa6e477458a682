//! Provider-specific raw payloads.
//!
//! Each upstream has its own field naming. Every shape deserializes leniently
//! (required fields are `Option`) so that a missing field becomes a
//! normalization error for that event rather than a decode failure for the
//! whole payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::price::PriceValue;

/// Raw odds data returned by one source adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", content = "events", rename_all = "snake_case")]
pub enum RawPayload {
    OddsApi(Vec<OddsApiEvent>),
    DraftKings(Vec<DraftKingsEvent>),
    FanDuel(Vec<FanDuelEvent>),
    BetMgm(Vec<BetMgmFixture>),
    Caesars(Vec<CaesarsEvent>),
}

impl RawPayload {
    /// Provider name used in logs and errors
    pub fn provider(&self) -> &'static str {
        match self {
            RawPayload::OddsApi(_) => "the-odds-api",
            RawPayload::DraftKings(_) => "draftkings",
            RawPayload::FanDuel(_) => "fanduel",
            RawPayload::BetMgm(_) => "betmgm",
            RawPayload::Caesars(_) => "caesars",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawPayload::OddsApi(events) => events.len(),
            RawPayload::DraftKings(events) => events.len(),
            RawPayload::FanDuel(events) => events.len(),
            RawPayload::BetMgm(events) => events.len(),
            RawPayload::Caesars(events) => events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// The Odds API (v4 /sports/{sport}/odds)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsApiEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sport_key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub commence_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub home_team: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub away_team: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub bookmakers: Vec<OddsApiBookmaker>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsApiBookmaker {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_update: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub markets: Vec<OddsApiMarket>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsApiMarket {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsApiOutcome {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<PriceValue>,
    /// Spread or total point; numbers or strings such as "+3.5"
    #[serde(default, deserialize_with = "lenient")]
    pub point: Option<PriceValue>,
}

/// A field of the wrong type reads as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Undecodable list items are dropped; a non-list reads as empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(items)) => {
            Ok(items.into_iter().filter_map(|item| serde_json::from_value(item).ok()).collect())
        }
        _ => Ok(Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// Scraped sportsbook pages
// ---------------------------------------------------------------------------

/// Lines block shared by every scraped sportsbook event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedLines {
    #[serde(default)]
    pub moneyline: Option<ScrapedMoneyline>,
    #[serde(default)]
    pub spread: Option<ScrapedSpread>,
    #[serde(default)]
    pub total: Option<ScrapedTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedMoneyline {
    pub away: Option<PriceValue>,
    pub home: Option<PriceValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedSpread {
    pub away: Option<ScrapedLine>,
    pub home: Option<ScrapedLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedTotal {
    pub over: Option<ScrapedLine>,
    pub under: Option<ScrapedLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedLine {
    pub line: Option<f64>,
    pub odds: Option<PriceValue>,
}

/// Named competitor object used by BetMGM and Caesars
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: Option<String>,
}

/// DraftKings event-group entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftKingsEvent {
    #[serde(rename = "eventId")]
    pub event_id: Option<serde_json::Value>,
    /// Away team
    #[serde(rename = "teamName1")]
    pub team_name1: Option<String>,
    /// Home team
    #[serde(rename = "teamName2")]
    pub team_name2: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(flatten)]
    pub lines: ScrapedLines,
}

/// FanDuel initial-state event (the id is the key of the events map)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FanDuelEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "awayTeamName")]
    pub away_team_name: Option<String>,
    #[serde(rename = "homeTeamName")]
    pub home_team_name: Option<String>,
    #[serde(rename = "openDate")]
    pub open_date: Option<String>,
    #[serde(flatten)]
    pub lines: ScrapedLines,
}

/// BetMGM fixture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetMgmFixture {
    pub id: Option<serde_json::Value>,
    #[serde(rename = "awayTeam")]
    pub away_team: Option<Competitor>,
    #[serde(rename = "homeTeam")]
    pub home_team: Option<Competitor>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(flatten)]
    pub lines: ScrapedLines,
}

/// Caesars page-props event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaesarsEvent {
    pub id: Option<serde_json::Value>,
    #[serde(rename = "awayCompetitor")]
    pub away_competitor: Option<Competitor>,
    #[serde(rename = "homeCompetitor")]
    pub home_competitor: Option<Competitor>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(flatten)]
    pub lines: ScrapedLines,
}

/// Provider-neutral view over a scraped event
#[derive(Debug, Clone)]
pub struct ScrapedView<'a> {
    pub id: Option<String>,
    pub away_team: Option<&'a str>,
    pub home_team: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub lines: &'a ScrapedLines,
}

/// Event ids show up as strings or numbers depending on the book
fn id_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl DraftKingsEvent {
    pub fn view(&self) -> ScrapedView<'_> {
        ScrapedView {
            id: id_string(self.event_id.as_ref()),
            away_team: self.team_name1.as_deref(),
            home_team: self.team_name2.as_deref(),
            start_time: self.start_date.as_deref(),
            lines: &self.lines,
        }
    }
}

impl FanDuelEvent {
    pub fn view(&self) -> ScrapedView<'_> {
        ScrapedView {
            id: self.id.clone().filter(|id| !id.trim().is_empty()),
            away_team: self.away_team_name.as_deref(),
            home_team: self.home_team_name.as_deref(),
            start_time: self.open_date.as_deref(),
            lines: &self.lines,
        }
    }
}

impl BetMgmFixture {
    pub fn view(&self) -> ScrapedView<'_> {
        ScrapedView {
            id: id_string(self.id.as_ref()),
            away_team: self.away_team.as_ref().and_then(|c| c.name.as_deref()),
            home_team: self.home_team.as_ref().and_then(|c| c.name.as_deref()),
            start_time: self.start_time.as_deref(),
            lines: &self.lines,
        }
    }
}

impl CaesarsEvent {
    pub fn view(&self) -> ScrapedView<'_> {
        ScrapedView {
            id: id_string(self.id.as_ref()),
            away_team: self.away_competitor.as_ref().and_then(|c| c.name.as_deref()),
            home_team: self.home_competitor.as_ref().and_then(|c| c.name.as_deref()),
            start_time: self.start_time.as_deref(),
            lines: &self.lines,
        }
    }
}
