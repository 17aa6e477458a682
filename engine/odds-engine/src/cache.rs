//! In-memory odds cache with lazy expiry
//!
//! Entries are keyed by the normalized query signature. Staleness is checked
//! on read, and expired entries are dropped whenever a new entry is written.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::model::Game;
use crate::signature::QuerySignature;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays valid
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(300) }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    games: Vec<Game>,
    created_at: DateTime<Utc>,
}

/// Shared odds cache
pub struct OddsCache {
    entries: RwLock<HashMap<QuerySignature, CacheEntry>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl OddsCache {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), config, clock }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(CacheConfig { ttl }, Arc::new(SystemClock))
    }

    /// Fresh games for a signature, or `None` on miss or expiry
    pub fn get(&self, signature: &QuerySignature) -> Option<Vec<Game>> {
        let entries = self.entries.read();
        let Some(entry) = entries.get(signature) else {
            debug!("Cache miss for {}", signature);
            return None;
        };

        if self.is_expired(entry) {
            debug!("Cache entry for {} expired", signature);
            return None;
        }

        debug!("Cache hit for {} ({} games)", signature, entry.games.len());
        Some(entry.games.clone())
    }

    /// Store games for a signature, replacing any existing entry.
    ///
    /// Expired entries for other signatures are dropped under the same lock.
    pub fn put(&self, signature: QuerySignature, games: Vec<Game>) {
        let count = games.len();
        let now = self.clock.now();
        let mut entries = self.entries.write();

        let before = entries.len();
        entries.retain(|_, entry| !Self::expired_at(&self.config, entry, now));
        let purged = before - entries.len();

        entries.insert(signature.clone(), CacheEntry { games, created_at: now });
        drop(entries);

        debug!(
            "Cached {} games for {} with TTL {}s ({} expired entries purged)",
            count,
            signature,
            self.config.ttl.as_secs(),
            purged
        );
    }

    /// Number of stored entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        Self::expired_at(&self.config, entry, self.clock.now())
    }

    fn expired_at(config: &CacheConfig, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(entry.created_at);
        match age.to_std() {
            Ok(age) => age >= config.ttl,
            // clock moved backwards
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::MarketType;
    use chrono::TimeZone;

    fn game(id: &str) -> Game {
        Game::new(id, "Home", "Away", Utc.with_ymd_and_hms(2025, 9, 7, 17, 0, 0).unwrap(), vec![])
    }

    fn cache_with_clock(ttl_secs: u64) -> (OddsCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()));
        let cache = OddsCache::new(CacheConfig { ttl: Duration::from_secs(ttl_secs) }, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_round_trip_and_expiry() {
        let (cache, clock) = cache_with_clock(300);
        let sig = QuerySignature::new([MarketType::H2h], ["draftkings"]);

        cache.put(sig.clone(), vec![game("g1")]);
        assert_eq!(cache.get(&sig), Some(vec![game("g1")]));

        clock.advance(chrono::Duration::seconds(299));
        assert!(cache.get(&sig).is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(cache.get(&sig), None);
    }

    #[test]
    fn test_put_overwrites() {
        let (cache, clock) = cache_with_clock(60);
        let sig = QuerySignature::all();

        cache.put(sig.clone(), vec![game("old")]);
        clock.advance(chrono::Duration::seconds(50));
        cache.put(sig.clone(), vec![game("new")]);
        clock.advance(chrono::Duration::seconds(30));

        // created_at was reset by the overwrite
        assert_eq!(cache.get(&sig), Some(vec![game("new")]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_purges_expired_entries() {
        let (cache, clock) = cache_with_clock(10);
        let totals = QuerySignature::new([MarketType::Totals], Vec::<String>::new());
        cache.put(QuerySignature::all(), vec![game("a")]);
        clock.advance(chrono::Duration::seconds(5));
        cache.put(totals.clone(), vec![game("b")]);
        clock.advance(chrono::Duration::seconds(5));

        // "a" is expired, "b" is still fresh
        cache.put(QuerySignature::new([MarketType::H2h], ["fanduel"]), vec![game("c")]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&QuerySignature::all()).is_none());
        assert_eq!(cache.get(&totals), Some(vec![game("b")]));
    }

    #[test]
    fn test_concurrent_put_and_get_see_whole_entries() {
        let cache = Arc::new(OddsCache::with_ttl(Duration::from_secs(300)));
        let sig = QuerySignature::all();

        // writer w always stores w + 1 games, all tagged with its own id
        let batch = |writer: usize| -> Vec<Game> {
            (0..=writer).map(|_| game(&format!("writer-{}", writer))).collect()
        };

        std::thread::scope(|scope| {
            for writer in 0..4 {
                let cache = cache.clone();
                let sig = sig.clone();
                scope.spawn(move || {
                    for _ in 0..500 {
                        cache.put(sig.clone(), batch(writer));
                    }
                });
            }

            for _ in 0..4 {
                let cache = cache.clone();
                let sig = sig.clone();
                scope.spawn(move || {
                    for _ in 0..500 {
                        let Some(games) = cache.get(&sig) else {
                            continue;
                        };
                        let id = games[0].id.clone();
                        let writer: usize = id["writer-".len()..].parse().unwrap();
                        assert_eq!(games.len(), writer + 1);
                        assert!(games.iter().all(|g| g.id == id));
                    }
                });
            }
        });

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_signatures_do_not_collide() {
        let (cache, _clock) = cache_with_clock(60);
        cache.put(QuerySignature::new([MarketType::H2h], Vec::<String>::new()), vec![game("a")]);
        assert!(cache.get(&QuerySignature::new([MarketType::Spreads], Vec::<String>::new())).is_none());
    }
}
