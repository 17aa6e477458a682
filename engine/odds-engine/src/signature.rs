//! Normalized identity of an odds query

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{OddsError, OddsResult};
use crate::model::MarketType;
use crate::sportsbooks;

/// Order-independent identity of an odds query.
///
/// An empty set means "all". A market set naming every market type collapses
/// to the empty set so both spellings share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QuerySignature {
    markets: BTreeSet<MarketType>,
    bookmakers: BTreeSet<String>,
}

impl QuerySignature {
    pub fn new<M, B, S>(markets: M, bookmakers: B) -> Self
    where
        M: IntoIterator<Item = MarketType>,
        B: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut markets: BTreeSet<MarketType> = markets.into_iter().collect();
        if markets.len() == MarketType::ALL.len() {
            markets.clear();
        }
        let bookmakers = bookmakers
            .into_iter()
            .map(|b| b.into().trim().to_ascii_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        Self { markets, bookmakers }
    }

    /// Signature matching every market and every bookmaker
    pub fn all() -> Self {
        Self::default()
    }

    pub fn markets(&self) -> &BTreeSet<MarketType> {
        &self.markets
    }

    pub fn bookmakers(&self) -> &BTreeSet<String> {
        &self.bookmakers
    }

    pub fn includes_market(&self, market: MarketType) -> bool {
        self.markets.is_empty() || self.markets.contains(&market)
    }

    pub fn includes_bookmaker(&self, key: &str) -> bool {
        self.bookmakers.is_empty() || self.bookmakers.contains(key)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.markets.is_empty() && self.bookmakers.is_empty()
    }
}

impl fmt::Display for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let markets: Vec<&str> = self.markets.iter().map(|m| m.as_str()).collect();
        let books: Vec<&str> = self.bookmakers.iter().map(String::as_str).collect();
        write!(
            f,
            "markets={};bookmakers={}",
            if markets.is_empty() { "*".to_string() } else { markets.join(",") },
            if books.is_empty() { "*".to_string() } else { books.join(",") }
        )
    }
}

impl QuerySignature {
    /// Parse comma-separated `markets` and `bookmakers` filters.
    ///
    /// Absent or blank filters mean "all". Unknown market names and
    /// bookmaker keys outside the catalog are `InvalidQuery`.
    pub fn parse(markets: Option<&str>, bookmakers: Option<&str>) -> OddsResult<Self> {
        let markets = split_list(markets)
            .map(|m| m.parse::<MarketType>())
            .collect::<OddsResult<Vec<_>>>()?;

        let bookmakers = split_list(bookmakers)
            .map(|b| {
                let key = b.to_ascii_lowercase();
                if sportsbooks::is_supported(&key) {
                    Ok(key)
                } else {
                    Err(OddsError::InvalidQuery(format!("unknown bookmaker '{}'", b)))
                }
            })
            .collect::<OddsResult<Vec<_>>>()?;

        Ok(Self::new(markets, bookmakers))
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or("").split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_order_independent() {
        let a = QuerySignature::new([MarketType::H2h, MarketType::Spreads], ["draftkings", "fanduel"]);
        let b = QuerySignature::new([MarketType::Spreads, MarketType::H2h], ["fanduel", "draftkings"]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "markets=h2h,spreads;bookmakers=draftkings,fanduel");
    }

    #[test]
    fn test_signature_all_markets_collapses() {
        let explicit = QuerySignature::new(MarketType::ALL, Vec::<String>::new());
        assert_eq!(explicit, QuerySignature::all());
        assert!(explicit.is_unfiltered());
        assert_eq!(explicit.to_string(), "markets=*;bookmakers=*");
    }

    #[test]
    fn test_parse_filters() {
        let sig = QuerySignature::parse(Some("spreads, h2h"), Some("FanDuel,draftkings")).unwrap();
        assert_eq!(sig, QuerySignature::new([MarketType::H2h, MarketType::Spreads], ["draftkings", "fanduel"]));
        assert!(sig.includes_market(MarketType::H2h));
        assert!(!sig.includes_market(MarketType::Totals));
        assert!(sig.includes_bookmaker("fanduel"));
        assert!(!sig.includes_bookmaker("betmgm"));
    }

    #[test]
    fn test_parse_absent_filters_mean_all() {
        assert_eq!(QuerySignature::parse(None, None).unwrap(), QuerySignature::all());
        assert_eq!(QuerySignature::parse(Some(""), Some(" , ")).unwrap(), QuerySignature::all());
    }

    #[test]
    fn test_parse_rejects_unknown_entries() {
        assert!(matches!(
            QuerySignature::parse(Some("h2h,props"), None),
            Err(OddsError::InvalidQuery(_))
        ));
        assert!(matches!(
            QuerySignature::parse(None, Some("draftkings,pinnacle")),
            Err(OddsError::InvalidQuery(_))
        ));
    }
}
