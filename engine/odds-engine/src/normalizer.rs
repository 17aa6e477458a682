//! Converts provider payloads into the unified Game/Bookmaker/Market schema

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{OddsError, OddsResult};
use crate::model::{Bookmaker, Game, Line, Market, MarketType, TotalSide};
use crate::price::PriceValue;
use crate::raw::{OddsApiBookmaker, OddsApiEvent, OddsApiMarket, RawPayload, ScrapedLine, ScrapedView};
use crate::sportsbooks;

/// Normalize every event in a provider payload.
///
/// Malformed events are skipped. The call only fails when the payload held
/// events and none of them could be normalized.
pub fn normalize(payload: &RawPayload) -> OddsResult<Vec<Game>> {
    let provider = payload.provider();
    let results: Vec<OddsResult<Game>> = match payload {
        RawPayload::OddsApi(events) => events.iter().map(normalize_odds_api_event).collect(),
        RawPayload::DraftKings(events) => {
            events.iter().map(|e| normalize_scraped(provider, &e.view())).collect()
        }
        RawPayload::FanDuel(events) => {
            events.iter().map(|e| normalize_scraped(provider, &e.view())).collect()
        }
        RawPayload::BetMgm(events) => {
            events.iter().map(|e| normalize_scraped(provider, &e.view())).collect()
        }
        RawPayload::Caesars(events) => {
            events.iter().map(|e| normalize_scraped(provider, &e.view())).collect()
        }
    };

    let total = results.len();
    let mut games = Vec::with_capacity(total);
    let mut last_error = None;
    for result in results {
        match result {
            Ok(game) => games.push(game),
            Err(e) => {
                warn!("Skipping event from {}: {}", provider, e);
                last_error = Some(e);
            }
        }
    }

    if games.is_empty() {
        if let Some(e) = last_error {
            return Err(OddsError::malformed(
                provider,
                format!("none of {} events could be normalized (last error: {})", total, e),
            ));
        }
    }

    debug!("Normalized {} of {} events from {}", games.len(), total, provider);
    Ok(games)
}

/// Normalize one Odds API event
pub fn normalize_odds_api_event(event: &OddsApiEvent) -> OddsResult<Game> {
    let provider = "the-odds-api";
    let id = required(provider, "id", event.id.as_deref())?;
    let home_team = required(provider, "home_team", event.home_team.as_deref())?;
    let away_team = required(provider, "away_team", event.away_team.as_deref())?;
    let commence_raw = required(provider, "commence_time", event.commence_time.as_deref())?;
    let commence_time = parse_timestamp(commence_raw).ok_or_else(|| {
        OddsError::malformed(provider, format!("unparseable commence_time '{}'", commence_raw))
    })?;

    let mut bookmakers: Vec<Bookmaker> = Vec::with_capacity(event.bookmakers.len());
    for raw in &event.bookmakers {
        match normalize_odds_api_bookmaker(raw) {
            Some(book) if bookmakers.iter().any(|b| b.key == book.key) => {
                debug!("Duplicate bookmaker {} on event {}", book.key, id);
            }
            Some(book) => bookmakers.push(book),
            None => debug!("Dropping bookmaker without key on event {}", id),
        }
    }

    Ok(Game::new(id, home_team, away_team, commence_time, bookmakers))
}

fn normalize_odds_api_bookmaker(raw: &OddsApiBookmaker) -> Option<Bookmaker> {
    let key = raw.key.as_deref().map(str::trim).filter(|k| !k.is_empty())?.to_string();
    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| sportsbooks::title_for(&key));

    let mut markets = BTreeMap::new();
    for market in &raw.markets {
        let market_key = market.key.as_deref().unwrap_or_default();
        let Ok(market_type) = market_key.parse::<MarketType>() else {
            debug!("Ignoring unsupported market '{}' from {}", market_key, key);
            continue;
        };
        if let Some(parsed) = parse_odds_api_market(market_type, market) {
            markets.insert(market_type, parsed);
        }
    }

    Some(Bookmaker {
        key,
        title,
        last_update: raw.last_update.as_deref().and_then(parse_timestamp),
        markets,
    })
}

fn parse_odds_api_market(market_type: MarketType, market: &OddsApiMarket) -> Option<Market> {
    // outcomes without a name or a usable price are dropped
    let priced = market.outcomes.iter().filter_map(|o| {
        let name = o.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let price = o.price.as_ref()?.to_american()?;
        Some((name, price, o.point.as_ref().and_then(PriceValue::to_point)))
    });

    let parsed = match market_type {
        MarketType::H2h => {
            Market::Moneyline(priced.map(|(name, price, _)| (name.to_string(), price)).collect())
        }
        MarketType::Spreads => Market::Spread(
            priced
                .filter_map(|(name, price, point)| {
                    point.map(|point| (name.to_string(), Line { point, price }))
                })
                .collect(),
        ),
        MarketType::Totals => Market::Total(
            priced
                .filter_map(|(name, price, point)| {
                    let side = TotalSide::from_label(name)?;
                    point.map(|point| (side, Line { point, price }))
                })
                .collect(),
        ),
    };

    (!parsed.is_empty()).then_some(parsed)
}

/// Normalize one scraped sportsbook event. The bookmaker is the provider itself.
pub fn normalize_scraped(provider: &str, event: &ScrapedView<'_>) -> OddsResult<Game> {
    let away_team = required(provider, "away team", team_name(event.away_team))?;
    let home_team = required(provider, "home team", team_name(event.home_team))?;
    let start_raw = required(provider, "start time", event.start_time)?;
    let commence_time = parse_timestamp(start_raw).ok_or_else(|| {
        OddsError::malformed(provider, format!("unparseable start time '{}'", start_raw))
    })?;

    let id = event
        .id
        .clone()
        .unwrap_or_else(|| derived_game_id(provider, away_team, home_team, commence_time));

    let lines = event.lines;
    let mut markets = BTreeMap::new();

    if let Some(moneyline) = &lines.moneyline {
        let prices: BTreeMap<String, i32> = [(away_team, &moneyline.away), (home_team, &moneyline.home)]
            .into_iter()
            .filter_map(|(team, price)| {
                price.as_ref().and_then(|p| p.to_american()).map(|p| (team.to_string(), p))
            })
            .collect();
        if !prices.is_empty() {
            markets.insert(MarketType::H2h, Market::Moneyline(prices));
        }
    }

    if let Some(spread) = &lines.spread {
        let sides: BTreeMap<String, Line> = [(away_team, &spread.away), (home_team, &spread.home)]
            .into_iter()
            .filter_map(|(team, line)| scraped_line(line.as_ref()).map(|l| (team.to_string(), l)))
            .collect();
        if !sides.is_empty() {
            markets.insert(MarketType::Spreads, Market::Spread(sides));
        }
    }

    if let Some(total) = &lines.total {
        let sides: BTreeMap<TotalSide, Line> =
            [(TotalSide::Over, &total.over), (TotalSide::Under, &total.under)]
                .into_iter()
                .filter_map(|(side, line)| scraped_line(line.as_ref()).map(|l| (side, l)))
                .collect();
        if !sides.is_empty() {
            markets.insert(MarketType::Totals, Market::Total(sides));
        }
    }

    let bookmaker = Bookmaker {
        key: provider.to_string(),
        title: sportsbooks::title_for(provider),
        last_update: None,
        markets,
    };

    Ok(Game::new(id, home_team, away_team, commence_time, vec![bookmaker]))
}

fn scraped_line(line: Option<&ScrapedLine>) -> Option<Line> {
    let line = line?;
    let price = line.odds.as_ref()?.to_american()?;
    Some(Line { point: line.line?, price })
}

/// Scrapers default unknown team names to "Unknown"
fn team_name(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case("unknown"))
}

fn required<'a>(provider: &str, field: &str, value: Option<&'a str>) -> OddsResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OddsError::malformed(provider, format!("missing {}", field)))
}

/// Stable id for a scraped event that carries none
pub fn derived_game_id(
    provider: &str,
    away_team: &str,
    home_team: &str,
    commence_time: DateTime<Utc>,
) -> String {
    format!(
        "{}-{}-at-{}-{}",
        provider,
        slug(away_team),
        slug(home_team),
        commence_time.format("%Y%m%d")
    )
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Parse RFC 3339, naive ISO (assumed UTC) or epoch milliseconds
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    raw.parse::<i64>().ok().and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{
        BetMgmFixture, Competitor, DraftKingsEvent, OddsApiOutcome, ScrapedLines, ScrapedMoneyline,
        ScrapedSpread, ScrapedTotal,
    };
    use serde_json::json;

    fn odds_api_payload() -> Vec<OddsApiEvent> {
        serde_json::from_value(json!([{
            "id": "e1",
            "sport_key": "americanfootball_nfl",
            "commence_time": "2025-09-07T17:00:00Z",
            "home_team": "Kansas City Chiefs",
            "away_team": "Baltimore Ravens",
            "bookmakers": [{
                "key": "draftkings",
                "title": "DraftKings",
                "last_update": "2025-09-06T12:00:00Z",
                "markets": [
                    {"key": "h2h", "outcomes": [
                        {"name": "Kansas City Chiefs", "price": -140},
                        {"name": "Baltimore Ravens", "price": 120}
                    ]},
                    {"key": "spreads", "outcomes": [
                        {"name": "Kansas City Chiefs", "price": -110, "point": -2.5},
                        {"name": "Baltimore Ravens", "price": -110, "point": 2.5}
                    ]}
                ]
            }]
        }]))
        .unwrap()
    }

    #[test]
    fn test_odds_api_event_normalization() {
        let games = normalize(&RawPayload::OddsApi(odds_api_payload())).unwrap();
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert_eq!(game.id, "e1");
        assert_eq!(game.home_team, "Kansas City Chiefs");
        assert_eq!(game.commence_time, Utc.with_ymd_and_hms(2025, 9, 7, 17, 0, 0).unwrap());

        let dk = game.bookmaker("draftkings").unwrap();
        assert_eq!(dk.moneyline().unwrap()["Kansas City Chiefs"], -140);
        assert_eq!(dk.spreads().unwrap()["Baltimore Ravens"], Line { point: 2.5, price: -110 });
        assert!(dk.last_update.is_some());
    }

    #[test]
    fn test_missing_optional_market_is_omitted() {
        let games = normalize(&RawPayload::OddsApi(odds_api_payload())).unwrap();
        let dk = games[0].bookmaker("draftkings").unwrap();
        assert!(!dk.markets.contains_key(&MarketType::Totals));

        let json = serde_json::to_value(dk).unwrap();
        assert!(json["markets"].get("totals").is_none());
    }

    #[test]
    fn test_market_without_valid_prices_is_omitted() {
        let mut events = odds_api_payload();
        events[0].bookmakers[0].markets.push(OddsApiMarket {
            key: Some("totals".to_string()),
            outcomes: vec![OddsApiOutcome {
                name: Some("Over".to_string()),
                price: Some(PriceValue::Integer(0)),
                point: Some(PriceValue::Decimal(47.5)),
            }],
        });
        let games = normalize(&RawPayload::OddsApi(events)).unwrap();
        assert!(!games[0].bookmakers[0].markets.contains_key(&MarketType::Totals));
    }

    #[test]
    fn test_bad_outcome_does_not_reject_payload() {
        let events: Vec<OddsApiEvent> = serde_json::from_value(json!([
            {
                "id": "e1",
                "commence_time": "2025-09-07T17:00:00Z",
                "home_team": "Kansas City Chiefs",
                "away_team": "Baltimore Ravens",
                "bookmakers": [{"key": "draftkings", "markets": [
                    {"key": "h2h", "outcomes": [
                        {"name": "Kansas City Chiefs", "price": -140},
                        {"name": "Baltimore Ravens", "price": 120}
                    ]}
                ]}]
            },
            {
                "id": "e2",
                "commence_time": "2025-09-07T20:25:00Z",
                "home_team": "Dallas Cowboys",
                "away_team": "New York Giants",
                "bookmakers": [{"key": "fanduel", "markets": [
                    {"key": "h2h", "outcomes": [
                        {"price": -110},
                        {"name": "New York Giants", "price": 105}
                    ]},
                    {"key": "spreads", "outcomes": [
                        {"name": "Dallas Cowboys", "price": -110, "point": "-3.5"},
                        {"name": "New York Giants", "price": -110, "point": {"value": 3.5}}
                    ]},
                    {"outcomes": []}
                ]}]
            }
        ]))
        .unwrap();

        let games = normalize(&RawPayload::OddsApi(events)).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].bookmakers[0].moneyline().unwrap().len(), 2);

        let fanduel = games[1].bookmaker("fanduel").unwrap();
        let moneyline = fanduel.moneyline().unwrap();
        assert_eq!(moneyline.len(), 1);
        assert_eq!(moneyline["New York Giants"], 105);
        let spreads = fanduel.spreads().unwrap();
        assert_eq!(spreads.len(), 1);
        assert_eq!(spreads["Dallas Cowboys"], Line { point: -3.5, price: -110 });
    }

    #[test]
    fn test_decimal_prices_normalized_to_american() {
        let mut events = odds_api_payload();
        events[0].bookmakers[0].markets[0].outcomes[1].price = Some(PriceValue::Decimal(2.5));
        let games = normalize(&RawPayload::OddsApi(events)).unwrap();
        assert_eq!(games[0].bookmakers[0].moneyline().unwrap()["Baltimore Ravens"], 150);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let payload = RawPayload::OddsApi(odds_api_payload());
        assert_eq!(normalize(&payload).unwrap(), normalize(&payload).unwrap());
    }

    #[test]
    fn test_malformed_event_is_skipped() {
        let mut events = odds_api_payload();
        events.push(OddsApiEvent { id: Some("e2".to_string()), ..Default::default() });
        let games = normalize(&RawPayload::OddsApi(events)).unwrap();
        assert_eq!(games.len(), 1);
    }

    #[test]
    fn test_all_events_malformed_fails() {
        let events = vec![OddsApiEvent { id: Some("e2".to_string()), ..Default::default() }];
        let result = normalize(&RawPayload::OddsApi(events));
        assert!(matches!(result, Err(OddsError::MalformedUpstreamData { .. })));
    }

    #[test]
    fn test_empty_payload_is_not_an_error() {
        assert!(normalize(&RawPayload::OddsApi(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_draftkings_event_normalization() {
        let event = DraftKingsEvent {
            event_id: Some(json!(180012)),
            team_name1: Some("Buffalo Bills".to_string()),
            team_name2: Some("Miami Dolphins".to_string()),
            start_date: Some("2025-09-14T17:00:00.0000000Z".to_string()),
            lines: ScrapedLines {
                moneyline: Some(ScrapedMoneyline {
                    away: Some(PriceValue::from("\u{2212}150")),
                    home: Some(PriceValue::from("+130")),
                }),
                spread: Some(ScrapedSpread {
                    away: Some(ScrapedLine { line: Some(-3.0), odds: Some(PriceValue::Integer(-110)) }),
                    home: Some(ScrapedLine { line: Some(0.0), odds: Some(PriceValue::Integer(0)) }),
                }),
                total: Some(ScrapedTotal::default()),
            },
        };

        let games = normalize(&RawPayload::DraftKings(vec![event])).unwrap();
        let game = &games[0];
        assert_eq!(game.id, "180012");
        assert_eq!(game.away_team, "Buffalo Bills");
        assert_eq!(game.home_team, "Miami Dolphins");

        let book = &game.bookmakers[0];
        assert_eq!(book.key, "draftkings");
        assert_eq!(book.title, "DraftKings");
        assert_eq!(book.moneyline().unwrap()["Buffalo Bills"], -150);
        assert_eq!(book.moneyline().unwrap()["Miami Dolphins"], 130);
        // placeholder zero odds drop the home side, an empty totals block drops the market
        assert_eq!(book.spreads().unwrap().len(), 1);
        assert!(book.totals().is_none());
    }

    #[test]
    fn test_scraped_event_without_id_gets_derived_id() {
        let fixture = BetMgmFixture {
            id: None,
            away_team: Some(Competitor { name: Some("New York Giants".to_string()) }),
            home_team: Some(Competitor { name: Some("Dallas Cowboys".to_string()) }),
            start_time: Some("2025-09-07T20:25:00".to_string()),
            lines: ScrapedLines::default(),
        };
        let games = normalize(&RawPayload::BetMgm(vec![fixture])).unwrap();
        assert_eq!(games[0].id, "betmgm-new-york-giants-at-dallas-cowboys-20250907");
        assert!(!games[0].has_offers);
    }

    #[test]
    fn test_unknown_team_name_is_malformed() {
        let event = DraftKingsEvent {
            team_name1: Some("Unknown".to_string()),
            team_name2: Some("Miami Dolphins".to_string()),
            start_date: Some("2025-09-14T17:00:00Z".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            normalize(&RawPayload::DraftKings(vec![event])),
            Err(OddsError::MalformedUpstreamData { .. })
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 9, 7, 17, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-09-07T17:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-09-07T13:00:00-04:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-09-07T17:00:00"), Some(expected));
        assert_eq!(parse_timestamp("1757264400000"), Some(expected));
        assert_eq!(parse_timestamp("next sunday"), None);
    }
}
