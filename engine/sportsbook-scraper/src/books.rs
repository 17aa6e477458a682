//! Scrapable sportsbooks

use std::fmt;
use std::str::FromStr;

use odds_engine::sportsbooks::title_for;
use odds_engine::OddsError;

/// Sportsbooks with a scraping adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sportsbook {
    DraftKings,
    FanDuel,
    BetMgm,
    Caesars,
}

impl Sportsbook {
    /// Registration order of the fallback adapters
    pub const ALL: [Sportsbook; 4] =
        [Sportsbook::DraftKings, Sportsbook::FanDuel, Sportsbook::BetMgm, Sportsbook::Caesars];

    /// Catalog key
    pub fn key(&self) -> &'static str {
        match self {
            Sportsbook::DraftKings => "draftkings",
            Sportsbook::FanDuel => "fanduel",
            Sportsbook::BetMgm => "betmgm",
            Sportsbook::Caesars => "caesars",
        }
    }

    pub fn title(&self) -> String {
        title_for(self.key())
    }

    /// NFL board page
    pub fn nfl_url(&self) -> &'static str {
        match self {
            Sportsbook::DraftKings => "https://sportsbook.draftkings.com/leagues/football/nfl",
            Sportsbook::FanDuel => "https://sportsbook.fanduel.com/navigation/nfl",
            Sportsbook::BetMgm => {
                "https://sports.betmgm.com/en/sports/football-11/betting/usa-9/nfl-35"
            }
            Sportsbook::Caesars => "https://sportsbook.caesars.com/us/nfl",
        }
    }
}

impl fmt::Display for Sportsbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Sportsbook {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Sportsbook::ALL
            .into_iter()
            .find(|book| book.key() == key)
            .ok_or_else(|| OddsError::InvalidQuery(format!("unsupported sportsbook '{}'", s)))
    }
}
