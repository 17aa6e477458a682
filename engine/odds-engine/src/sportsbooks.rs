//! Supported sportsbooks and their priority order

use serde::Serialize;

use crate::error::{OddsError, OddsResult};

/// A sportsbook the service knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SportsbookInfo {
    pub key: &'static str,
    pub title: &'static str,
}

/// Every supported sportsbook, in default priority order
pub const SPORTSBOOKS: &[SportsbookInfo] = &[
    SportsbookInfo { key: "draftkings", title: "DraftKings" },
    SportsbookInfo { key: "fanduel", title: "FanDuel" },
    SportsbookInfo { key: "betmgm", title: "BetMGM" },
    SportsbookInfo { key: "caesars", title: "Caesars" },
    SportsbookInfo { key: "pointsbetus", title: "PointsBet" },
    SportsbookInfo { key: "bovada", title: "Bovada" },
    SportsbookInfo { key: "mybookieag", title: "MyBookie" },
    SportsbookInfo { key: "betus", title: "BetUS" },
    SportsbookInfo { key: "lowvig", title: "LowVig" },
    SportsbookInfo { key: "williamhill_us", title: "William Hill" },
];

pub fn lookup(key: &str) -> Option<&'static SportsbookInfo> {
    SPORTSBOOKS.iter().find(|book| book.key == key)
}

pub fn is_supported(key: &str) -> bool {
    lookup(key).is_some()
}

/// Display title for a key, falling back to the key itself
pub fn title_for(key: &str) -> String {
    lookup(key).map(|book| book.title.to_string()).unwrap_or_else(|| key.to_string())
}

/// Deterministic bookmaker ranking used for tie-breaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPriority {
    order: Vec<String>,
}

impl Default for BookPriority {
    fn default() -> Self {
        Self { order: SPORTSBOOKS.iter().map(|book| book.key.to_string()).collect() }
    }
}

impl BookPriority {
    /// Build a priority list. Unknown keys are rejected; duplicates keep their first position.
    pub fn new<I, S>(keys: I) -> OddsResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut order: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref().trim().to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            if !is_supported(&key) {
                return Err(OddsError::Config(format!("unknown sportsbook '{}' in priority", key)));
            }
            if !order.contains(&key) {
                order.push(key);
            }
        }
        Ok(Self { order })
    }

    /// Rank of a key; lower is preferred. Unlisted keys rank after every listed key.
    pub fn rank(&self, key: &str) -> usize {
        self.order.iter().position(|k| k == key).unwrap_or(self.order.len())
    }

    pub fn keys(&self) -> &[String] {
        &self.order
    }
}
