//! Embedded-JSON extraction from sportsbook pages
//!
//! Pure functions over page HTML; no network access. A page without the
//! expected data block is reported as `MalformedUpstreamData`, while a data
//! block with zero events is a valid empty board.

use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use odds_engine::raw::{BetMgmFixture, CaesarsEvent, DraftKingsEvent, FanDuelEvent, RawPayload};
use odds_engine::{OddsError, OddsResult};

use crate::books::Sportsbook;

const JSON_SCRIPT: &str = r#"script[type="application/json"]"#;
const NEXT_DATA_SCRIPT: &str = "script#__NEXT_DATA__";
const FANDUEL_STATE_MARKER: &str = "window.__INITIAL_STATE__";
const NEXT_DATA_MARKER: &str = "__NEXT_DATA__";

/// Extract the raw odds payload embedded in a sportsbook's NFL page
pub fn extract_payload(book: Sportsbook, html: &str) -> OddsResult<RawPayload> {
    let document = Html::parse_document(html);
    let payload = match book {
        Sportsbook::DraftKings => RawPayload::DraftKings(draftkings_events(&document)?),
        Sportsbook::FanDuel => RawPayload::FanDuel(fanduel_events(&document)?),
        Sportsbook::BetMgm => RawPayload::BetMgm(betmgm_fixtures(&document)?),
        Sportsbook::Caesars => RawPayload::Caesars(caesars_events(&document)?),
    };
    debug!("Extracted {} {} events", payload.len(), book);
    Ok(payload)
}

/// DraftKings: an `application/json` script whose object carries `eventGroup`
fn draftkings_events(document: &Html) -> OddsResult<Vec<DraftKingsEvent>> {
    let book = Sportsbook::DraftKings;
    let mut found = false;
    let mut events = Vec::new();

    for text in script_texts(book, document, JSON_SCRIPT)? {
        let Some(data) = parse_leading_json(&text) else {
            continue;
        };
        let Some(group) = data.get("eventGroup") else {
            continue;
        };
        found = true;
        let list = data.get("events").or_else(|| group.get("events"));
        events.extend(decode_list::<DraftKingsEvent>(book, list));
    }

    if found {
        Ok(events)
    } else {
        Err(missing_data(book))
    }
}

/// FanDuel: `window.__INITIAL_STATE__=` assignment with an id-keyed events map
fn fanduel_events(document: &Html) -> OddsResult<Vec<FanDuelEvent>> {
    let book = Sportsbook::FanDuel;

    for text in script_texts(book, document, "script")? {
        let Some((_, assignment)) = text.split_once(FANDUEL_STATE_MARKER) else {
            continue;
        };
        let Some(state) = parse_leading_json(assignment.trim_start_matches([' ', '='])) else {
            continue;
        };

        let mut events = Vec::new();
        if let Some(map) = state.get("events").and_then(Value::as_object) {
            for (id, raw) in map {
                if let Some(mut event) = decode::<FanDuelEvent>(book, raw) {
                    event.id.get_or_insert_with(|| id.clone());
                    events.push(event);
                }
            }
        }
        return Ok(events);
    }

    Err(missing_data(book))
}

/// BetMGM: `application/json` scripts whose top-level values wrap a `fixture`
fn betmgm_fixtures(document: &Html) -> OddsResult<Vec<BetMgmFixture>> {
    let book = Sportsbook::BetMgm;
    let mut found = false;
    let mut fixtures = Vec::new();

    for text in script_texts(book, document, JSON_SCRIPT)? {
        let Some(Value::Object(data)) = parse_leading_json(&text) else {
            continue;
        };
        for value in data.values() {
            if let Some(fixture) = value.get("fixture") {
                found = true;
                fixtures.extend(decode::<BetMgmFixture>(book, fixture));
            }
        }
    }

    if found {
        Ok(fixtures)
    } else {
        Err(missing_data(book))
    }
}

/// Caesars: Next.js page data, `props.pageProps.events`
fn caesars_events(document: &Html) -> OddsResult<Vec<CaesarsEvent>> {
    let book = Sportsbook::Caesars;

    let mut candidates = script_texts(book, document, NEXT_DATA_SCRIPT)?;
    for text in script_texts(book, document, "script")? {
        if let Some((_, rest)) = text.split_once(NEXT_DATA_MARKER) {
            candidates.push(rest.trim_start_matches([' ', '=']).to_string());
        }
    }

    for text in candidates {
        let Some(data) = parse_leading_json(&text) else {
            continue;
        };
        let Some(page_props) = data.get("props").and_then(|p| p.get("pageProps")) else {
            continue;
        };
        return Ok(decode_list::<CaesarsEvent>(book, page_props.get("events")));
    }

    Err(missing_data(book))
}

fn script_texts(book: Sportsbook, document: &Html, css: &str) -> OddsResult<Vec<String>> {
    let selector = Selector::parse(css)
        .map_err(|e| OddsError::malformed(book.key(), format!("invalid selector {}: {}", css, e)))?;
    Ok(document.select(&selector).map(|script| script.text().collect::<String>()).collect())
}

/// Parse the first JSON value in `text`, ignoring anything after it
fn parse_leading_json(text: &str) -> Option<Value> {
    let mut values = serde_json::Deserializer::from_str(text.trim()).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            debug!("Could not parse script JSON: {}", e);
            None
        }
        None => None,
    }
}

fn decode<T: DeserializeOwned>(book: Sportsbook, value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!("Skipping undecodable {} event: {}", book, e);
            None
        }
    }
}

fn decode_list<T: DeserializeOwned>(book: Sportsbook, list: Option<&Value>) -> Vec<T> {
    list.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|item| decode(book, item)).collect())
        .unwrap_or_default()
}

fn missing_data(book: Sportsbook) -> OddsError {
    OddsError::malformed(book.key(), "no embedded odds data found on page")
}

#[cfg(test)]
mod tests {
    use super::*;
    use odds_engine::normalize;

    const DRAFTKINGS_PAGE: &str = r#"<html><head>
        <script type="application/json">{"config": {"theme": "dark"}}</script>
        <script type="application/json">
        {"eventGroup": {"name": "NFL"}, "events": [
            {"eventId": 31245, "teamName1": "Baltimore Ravens", "teamName2": "Kansas City Chiefs",
             "startDate": "2025-09-05T00:20:00Z",
             "moneyline": {"away": "+120", "home": "−140"},
             "spread": {"away": {"line": 3.0, "odds": -110}, "home": {"line": -3.0, "odds": -110}},
             "total": {"over": {"line": 47.5, "odds": -110}, "under": {"line": 47.5, "odds": -110}}},
            {"eventId": 31246, "teamName1": "Green Bay Packers", "startDate": "2025-09-07T17:00:00Z"}
        ]}
        </script></head><body></body></html>"#;

    const FANDUEL_PAGE: &str = r#"<html><body>
        <script>window.dataLayer = [];</script>
        <script>window.__INITIAL_STATE__={"events": {
            "34098123": {"awayTeamName": "New York Giants", "homeTeamName": "Dallas Cowboys",
                         "openDate": "2025-09-07T20:25:00.000Z",
                         "moneyline": {"away": 210, "home": -260}}
        }};window.__APP_VERSION__="4.2";</script>
        </body></html>"#;

    const BETMGM_PAGE: &str = r#"<html><body>
        <script type="application/json">{
            "widget-1": {"fixture": {"awayTeam": {"name": "New York Giants"},
                                     "homeTeam": {"name": "Dallas Cowboys"},
                                     "startTime": "2025-09-07T17:00:00Z",
                                     "moneyline": {"away": 2.9, "home": 1.44}}},
            "layout": {"columns": 3}
        }</script>
        </body></html>"#;

    const CAESARS_PAGE: &str = r#"<html><body>
        <script id="__NEXT_DATA__" type="application/json">{"props": {"pageProps": {"events": [
            {"id": "c-991", "awayCompetitor": {"name": "Buffalo Bills"},
             "homeCompetitor": {"name": "Miami Dolphins"}, "startTime": "2025-09-14T17:00:00Z",
             "total": {"over": {"line": 49.5, "odds": "-115"}, "under": {"line": 49.5, "odds": "-105"}}}
        ]}}}</script>
        </body></html>"#;

    #[test]
    fn test_draftkings_event_group() {
        let payload = extract_payload(Sportsbook::DraftKings, DRAFTKINGS_PAGE).unwrap();
        assert_eq!(payload.len(), 2);

        // the second event has no home team and is skipped by the normalizer
        let games = normalize(&payload).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, "31245");
        let dk = games[0].bookmaker("draftkings").unwrap();
        assert_eq!(dk.moneyline().unwrap()["Kansas City Chiefs"], -140);
        assert_eq!(dk.moneyline().unwrap()["Baltimore Ravens"], 120);
    }

    #[test]
    fn test_fanduel_initial_state() {
        let payload = extract_payload(Sportsbook::FanDuel, FANDUEL_PAGE).unwrap();
        let games = normalize(&payload).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, "34098123");
        assert_eq!(games[0].home_team, "Dallas Cowboys");
        assert_eq!(games[0].bookmakers[0].title, "FanDuel");
    }

    #[test]
    fn test_betmgm_fixture_values() {
        let payload = extract_payload(Sportsbook::BetMgm, BETMGM_PAGE).unwrap();
        let games = normalize(&payload).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, "betmgm-new-york-giants-at-dallas-cowboys-20250907");

        // decimal prices are converted to american odds
        let moneyline = games[0].bookmakers[0].moneyline().unwrap();
        assert_eq!(moneyline["New York Giants"], 190);
        assert_eq!(moneyline["Dallas Cowboys"], -227);
    }

    #[test]
    fn test_caesars_next_data() {
        let payload = extract_payload(Sportsbook::Caesars, CAESARS_PAGE).unwrap();
        let games = normalize(&payload).unwrap();
        assert_eq!(games[0].id, "c-991");
        let totals = games[0].bookmakers[0].totals().unwrap();
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn test_page_without_data_is_malformed() {
        let page = "<html><body><div class=\"event-cell\">Loading...</div></body></html>";
        for book in Sportsbook::ALL {
            let result = extract_payload(book, page);
            assert!(
                matches!(result, Err(OddsError::MalformedUpstreamData { .. })),
                "{} should report missing data",
                book
            );
        }
    }

    #[test]
    fn test_empty_board_is_valid() {
        let page = r#"<script type="application/json">{"eventGroup": {"events": []}}</script>"#;
        let payload = extract_payload(Sportsbook::DraftKings, page).unwrap();
        assert!(payload.is_empty());
    }
}
