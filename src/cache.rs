//! Time-boxed cache for ranking results.
//!
//! Public leaderboards are expensive grouped/sorted queries whose value
//! decays slowly; entries are computed on first request after expiry and
//! held for a fixed duration regardless of intervening writes. The cache is
//! an injected abstraction, not a process-global static, so the ranking
//! engine can be tested against a no-op.

use crate::models::ranking::{RankingEntry, RankingKey};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Key → ranking rows with wall-clock expiry. Implementations must be cheap
/// on miss; the engine treats a miss as "recompute and put".
pub trait RankingCache: Send + Sync {
    fn get(&self, key: &RankingKey) -> Option<Vec<RankingEntry>>;
    fn put(&self, key: RankingKey, entries: Vec<RankingEntry>);
}

/// In-memory TTL cache guarded by an `RwLock`.
pub struct MemoryRankingCache {
    ttl: Duration,
    entries: RwLock<HashMap<RankingKey, (Instant, Vec<RankingEntry>)>>,
}

impl MemoryRankingCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl RankingCache for MemoryRankingCache {
    fn get(&self, key: &RankingKey) -> Option<Vec<RankingEntry>> {
        let entries = self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(key) {
            Some((stored_at, rows)) if stored_at.elapsed() < self.ttl => Some(rows.clone()),
            _ => None,
        }
    }

    fn put(&self, key: RankingKey, rows: Vec<RankingEntry>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Opportunistic cleanup of expired entries; the key space is small
        // (one entry per scope+order), so a full sweep is fine.
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), rows));
    }
}

/// Cache that never hits. Used in tests and by deployments that prefer
/// always-fresh rankings.
pub struct NoopRankingCache;

impl RankingCache for NoopRankingCache {
    fn get(&self, _key: &RankingKey) -> Option<Vec<RankingEntry>> {
        None
    }

    fn put(&self, _key: RankingKey, _entries: Vec<RankingEntry>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SortOrder, UnitKind};
    use crate::models::ranking::RankingScope;

    fn key(order: SortOrder) -> RankingKey {
        RankingKey {
            scope: RankingScope::Shows,
            order,
        }
    }

    fn entry(id: i32) -> RankingEntry {
        RankingEntry {
            kind: UnitKind::Show,
            id,
            name: format!("show {id}"),
            show_name: None,
            season_number: None,
            episode_number: None,
            mean_rating: 15.0,
            rating_count: 10,
        }
    }

    #[test]
    fn hit_within_ttl() {
        let cache = MemoryRankingCache::new(Duration::from_secs(60));
        cache.put(key(SortOrder::Descending), vec![entry(1)]);
        let got = cache.get(&key(SortOrder::Descending)).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, 1);
    }

    #[test]
    fn miss_after_expiry() {
        let cache = MemoryRankingCache::new(Duration::ZERO);
        cache.put(key(SortOrder::Descending), vec![entry(1)]);
        assert!(cache.get(&key(SortOrder::Descending)).is_none());
    }

    #[test]
    fn orders_are_distinct_entries() {
        let cache = MemoryRankingCache::new(Duration::from_secs(60));
        cache.put(key(SortOrder::Descending), vec![entry(1)]);
        assert!(cache.get(&key(SortOrder::Ascending)).is_none());
    }

    #[test]
    fn noop_never_hits() {
        let cache = NoopRankingCache;
        cache.put(key(SortOrder::Descending), vec![entry(1)]);
        assert!(cache.get(&key(SortOrder::Descending)).is_none());
    }
}
