//! Best-price comparison across bookmakers
//!
//! American odds are ordered so that the numerically larger price always pays
//! more: -110 beats -120, +150 beats +130, and any plus price beats any minus
//! price. Ties go to the bookmaker ranked first in [`BookPriority`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{AmericanOdds, Bookmaker, Game, Line, TotalSide};
use crate::price::implied_probability;
use crate::sportsbooks::BookPriority;

const POINT_EPSILON: f64 = 1e-9;

/// Best comparison result for one game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub game: GameSummary,
    pub best_odds: BestOdds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
}

/// Best offer per side, per market
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct BestOdds {
    /// Team -> best moneyline
    pub moneyline: BTreeMap<String, BestOffer>,
    /// Team -> spread comparison
    pub spreads: BTreeMap<String, LineComparison>,
    /// Over/under -> total comparison
    pub totals: BTreeMap<TotalSide, LineComparison>,
}

/// The most favorable price found for one side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestOffer {
    pub bookmaker: String,
    pub title: String,
    pub price: AmericanOdds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
    pub implied_probability: f64,
}

/// Spread/total comparison for one side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineComparison {
    /// Most common point value across books
    pub point: f64,
    /// Best price at that point
    pub best: BestOffer,
    /// Number of books posting that point
    pub books: usize,
    /// Other point levels, compared only among books posting the same point
    pub other_points: Vec<PointLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PointLevel {
    Compared { point: f64, best: BestOffer },
    NoComparableBooks { point: f64, bookmaker: String },
}

/// Find the best price per side for every market of a game
pub fn best_odds(game: &Game, priority: &BookPriority) -> ComparisonResult {
    let books = ordered_books(game, priority);
    let mut best = BestOdds::default();

    let mut moneyline_sides: Vec<&String> = Vec::new();
    let mut spread_sides: Vec<&String> = Vec::new();
    for book in &books {
        for side in book.moneyline().into_iter().flat_map(|m| m.keys()) {
            if !moneyline_sides.contains(&side) {
                moneyline_sides.push(side);
            }
        }
        for side in book.spreads().into_iter().flat_map(|m| m.keys()) {
            if !spread_sides.contains(&side) {
                spread_sides.push(side);
            }
        }
    }

    for side in moneyline_sides {
        let offers = books
            .iter()
            .filter_map(|book| book.moneyline()?.get(side).map(|price| (*book, *price, None)));
        if let Some(offer) = pick_best(offers) {
            best.moneyline.insert(side.clone(), offer);
        }
    }

    for side in spread_sides {
        let offers: Vec<(&Bookmaker, Line)> = books
            .iter()
            .filter_map(|book| book.spreads()?.get(side).map(|line| (*book, *line)))
            .collect();
        if let Some(comparison) = compare_lines(&offers) {
            best.spreads.insert(side.clone(), comparison);
        }
    }

    for side in [TotalSide::Over, TotalSide::Under] {
        let offers: Vec<(&Bookmaker, Line)> = books
            .iter()
            .filter_map(|book| book.totals()?.get(&side).map(|line| (*book, *line)))
            .collect();
        if let Some(comparison) = compare_lines(&offers) {
            best.totals.insert(side, comparison);
        }
    }

    ComparisonResult {
        game: GameSummary {
            id: game.id.clone(),
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),
            commence_time: game.commence_time,
        },
        best_odds: best,
    }
}

/// Bookmakers in priority order; unlisted books keep their game order after listed ones
fn ordered_books<'a>(game: &'a Game, priority: &BookPriority) -> Vec<&'a Bookmaker> {
    let mut books: Vec<&Bookmaker> = game.bookmakers.iter().collect();
    books.sort_by_key(|book| priority.rank(&book.key));
    books
}

/// Highest price wins; the first offer (highest priority) wins ties
fn pick_best<'a, I>(offers: I) -> Option<BestOffer>
where
    I: IntoIterator<Item = (&'a Bookmaker, AmericanOdds, Option<f64>)>,
{
    let mut best: Option<(&Bookmaker, AmericanOdds, Option<f64>)> = None;
    for offer in offers {
        if best.map_or(true, |(_, price, _)| payout_rank(offer.1) > payout_rank(price)) {
            best = Some(offer);
        }
    }

    best.map(|(book, price, point)| BestOffer {
        bookmaker: book.key.clone(),
        title: book.title.clone(),
        price,
        point,
        implied_probability: implied_probability(price),
    })
}

// -100 and +100 pay the same
fn payout_rank(price: AmericanOdds) -> AmericanOdds {
    if price == -100 {
        100
    } else {
        price
    }
}

fn compare_lines(offers: &[(&Bookmaker, Line)]) -> Option<LineComparison> {
    // point levels in order of first appearance, which is priority order
    let mut levels: Vec<(f64, Vec<(&Bookmaker, Line)>)> = Vec::new();
    for (book, line) in offers {
        match levels.iter_mut().find(|(point, _)| (*point - line.point).abs() < POINT_EPSILON) {
            Some((_, members)) => members.push((*book, *line)),
            None => levels.push((line.point, vec![(*book, *line)])),
        }
    }

    let mut consensus: Option<usize> = None;
    for (idx, (_, members)) in levels.iter().enumerate() {
        if consensus.map_or(true, |c| members.len() > levels[c].1.len()) {
            consensus = Some(idx);
        }
    }
    let consensus = consensus?;

    let (point, members) = &levels[consensus];
    let best = best_at_point(members)?;

    let mut other_points: Vec<PointLevel> = levels
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != consensus)
        .filter_map(|(_, (point, members))| match members.as_slice() {
            [(book, _)] => {
                Some(PointLevel::NoComparableBooks { point: *point, bookmaker: book.key.clone() })
            }
            _ => best_at_point(members).map(|best| PointLevel::Compared { point: *point, best }),
        })
        .collect();
    other_points.sort_by(|a, b| level_point(a).total_cmp(&level_point(b)));

    Some(LineComparison { point: *point, best, books: members.len(), other_points })
}

fn best_at_point(members: &[(&Bookmaker, Line)]) -> Option<BestOffer> {
    pick_best(members.iter().map(|(book, line)| (*book, line.price, Some(line.point))))
}

fn level_point(level: &PointLevel) -> f64 {
    match level {
        PointLevel::Compared { point, .. } | PointLevel::NoComparableBooks { point, .. } => *point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Market, MarketType};
    use crate::price::PriceValue;
    use chrono::TimeZone;

    const HOME: &str = "Kansas City Chiefs";
    const AWAY: &str = "Baltimore Ravens";

    fn book(key: &str, markets: Vec<Market>) -> Bookmaker {
        Bookmaker {
            key: key.to_string(),
            title: key.to_uppercase(),
            last_update: None,
            markets: markets.into_iter().map(|m| (m.market_type(), m)).collect(),
        }
    }

    fn moneyline(home: i32, away: i32) -> Market {
        Market::Moneyline(BTreeMap::from([(HOME.to_string(), home), (AWAY.to_string(), away)]))
    }

    fn spread(home_point: f64, home_price: i32) -> Market {
        Market::Spread(BTreeMap::from([
            (HOME.to_string(), Line { point: home_point, price: home_price }),
            (AWAY.to_string(), Line { point: -home_point, price: -110 }),
        ]))
    }

    fn total(point: f64, over: i32, under: i32) -> Market {
        Market::Total(BTreeMap::from([
            (TotalSide::Over, Line { point, price: over }),
            (TotalSide::Under, Line { point, price: under }),
        ]))
    }

    fn game(books: Vec<Bookmaker>) -> Game {
        Game::new("g1", HOME, AWAY, Utc.with_ymd_and_hms(2025, 9, 7, 0, 20, 0).unwrap(), books)
    }

    #[test]
    fn test_moneyline_favorite_least_negative_wins() {
        let g = game(vec![
            book("draftkings", vec![moneyline(-140, 120)]),
            book("fanduel", vec![moneyline(-120, 100)]),
            book("betmgm", vec![moneyline(-150, 130)]),
        ]);
        let result = best_odds(&g, &BookPriority::default());

        let home = &result.best_odds.moneyline[HOME];
        assert_eq!(home.bookmaker, "fanduel");
        assert_eq!(home.price, -120);

        let away = &result.best_odds.moneyline[AWAY];
        assert_eq!(away.bookmaker, "betmgm");
        assert_eq!(away.price, 130);
    }

    #[test]
    fn test_moneyline_tie_goes_to_priority() {
        // fanduel listed first in the game, but draftkings ranks higher
        let g = game(vec![
            book("fanduel", vec![moneyline(-110, -110)]),
            book("draftkings", vec![moneyline(-110, -110)]),
        ]);
        let priority = BookPriority::default();
        for _ in 0..5 {
            let result = best_odds(&g, &priority);
            assert_eq!(result.best_odds.moneyline[HOME].bookmaker, "draftkings");
        }

        let reversed = BookPriority::new(["fanduel", "draftkings"]).unwrap();
        assert_eq!(best_odds(&g, &reversed).best_odds.moneyline[HOME].bookmaker, "fanduel");
    }

    #[test]
    fn test_even_money_tie_goes_to_priority() {
        let g = game(vec![
            book("fanduel", vec![moneyline(100, -120)]),
            book("draftkings", vec![moneyline(-100, -120)]),
        ]);
        let result = best_odds(&g, &BookPriority::default());
        assert_eq!(result.best_odds.moneyline[HOME].bookmaker, "draftkings");

        // after normalization both books carry the same price
        let normalized = PriceValue::Text("-100".to_string()).to_american();
        assert_eq!(normalized, Some(100));
        let g = game(vec![
            book("fanduel", vec![moneyline(100, -120)]),
            book("draftkings", vec![moneyline(normalized.unwrap(), -120)]),
        ]);
        let home = &best_odds(&g, &BookPriority::default()).best_odds.moneyline[HOME];
        assert_eq!((home.bookmaker.as_str(), home.price), ("draftkings", 100));
    }

    #[test]
    fn test_spread_compares_at_consensus_point() {
        let g = game(vec![
            book("draftkings", vec![spread(-3.0, -115)]),
            book("fanduel", vec![spread(-3.0, -105)]),
            book("betmgm", vec![spread(-2.5, -130)]),
            book("caesars", vec![spread(-3.5, 100)]),
            book("bovada", vec![spread(-3.5, -102)]),
        ]);
        let result = best_odds(&g, &BookPriority::default());
        let home = &result.best_odds.spreads[HOME];

        assert_eq!(home.point, -3.0);
        assert_eq!(home.books, 2);
        assert_eq!(home.best.bookmaker, "fanduel");
        assert_eq!(home.best.price, -105);
        assert_eq!(home.best.point, Some(-3.0));

        assert_eq!(
            home.other_points,
            vec![
                PointLevel::Compared {
                    point: -3.5,
                    best: BestOffer {
                        bookmaker: "caesars".to_string(),
                        title: "CAESARS".to_string(),
                        price: 100,
                        point: Some(-3.5),
                        implied_probability: 50.0,
                    },
                },
                PointLevel::NoComparableBooks { point: -2.5, bookmaker: "betmgm".to_string() },
            ]
        );
    }

    #[test]
    fn test_consensus_tie_goes_to_priority() {
        let g = game(vec![
            book("betmgm", vec![total(44.5, -110, -110)]),
            book("draftkings", vec![total(45.5, -105, -115)]),
        ]);
        let result = best_odds(&g, &BookPriority::default());
        let over = &result.best_odds.totals[&TotalSide::Over];
        assert_eq!(over.point, 45.5);
        assert_eq!(over.best.bookmaker, "draftkings");
        assert!(matches!(
            over.other_points.as_slice(),
            [PointLevel::NoComparableBooks { bookmaker, .. }] if bookmaker == "betmgm"
        ));
    }

    #[test]
    fn test_missing_markets_yield_empty_sections() {
        let g = game(vec![book("draftkings", vec![moneyline(-140, 120)])]);
        let result = best_odds(&g, &BookPriority::default());
        assert!(result.best_odds.spreads.is_empty());
        assert!(result.best_odds.totals.is_empty());
        assert!(result.game.id == "g1" && result.best_odds.moneyline.len() == 2);
        assert!(g.bookmakers[0].market(MarketType::Totals).is_none());
    }

    #[test]
    fn test_comparison_json_shape() {
        let g = game(vec![book("draftkings", vec![total(47.5, -110, -110)])]);
        let json = serde_json::to_value(best_odds(&g, &BookPriority::default())).unwrap();
        assert_eq!(json["best_odds"]["totals"]["over"]["point"], 47.5);
        assert_eq!(json["best_odds"]["totals"]["under"]["best"]["bookmaker"], "draftkings");
        assert_eq!(json["game"]["home_team"], HOME);
    }
}
