//! # Gap Cache
//!
//! Bookkeeping for missing block dependencies: which hashes are absent,
//! which blocks wait on them, and which gaps are stale enough to fetch
//! from peers.
//!
//! The cache is pure in-memory state; `add` and `resolve` are total
//! functions. Deciding *when* to bootstrap is separated from the
//! bookkeeping (`fetch_candidates`) so the service can fire network
//! signals without holding the cache lock, and so tests can verify the
//! bookkeeping without a live network.

use shared_types::{Block, Hash};
use tracing::warn;

use super::entities::Timestamp;
use super::invariants;
use super::store::DependencyStore;
use super::value_objects::GapStats;
use crate::config::GapConfig;

/// In-memory cache of missing dependencies and their waiting blocks.
///
/// Rebuilt empty on every process start; this is a recovery aid, not
/// ledger state.
#[derive(Debug)]
pub struct GapCache {
    config: GapConfig,
    store: DependencyStore,
}

impl GapCache {
    pub fn new(config: GapConfig) -> Self {
        Self {
            config,
            store: DependencyStore::new(),
        }
    }

    pub fn config(&self) -> &GapConfig {
        &self.config
    }

    /// Records that `dependent` could not be applied because `missing` is
    /// absent from the ledger.
    ///
    /// Re-reporting the same missing hash refreshes its arrival in place;
    /// re-reporting the same dependent stores it once. If the cache exceeds
    /// its capacity ceiling the oldest records are evicted; the network
    /// layer will redeliver their dependents if they still matter.
    pub fn add(&mut self, dependent: Block, missing: Hash, now: Timestamp) {
        let dependent_hash = dependent.hash();
        let record = self.store.upsert(missing, now);
        record.dependents.insert(dependent_hash, dependent);

        while self.store.len() > self.config.max_records {
            if let Some(evicted) = self.store.pop_oldest() {
                warn!(
                    missing = ?&evicted.missing_hash[..4],
                    dependents = evicted.dependent_count(),
                    "gap cache at capacity, evicting oldest record"
                );
            } else {
                break;
            }
        }

        debug_assert_eq!(invariants::check_all(&self.store), Ok(()));
    }

    /// Called when `hash` has become present in the ledger. Erases the
    /// record if one exists and returns the blocks that were waiting on it;
    /// an empty vec means nothing was removed.
    pub fn resolve(&mut self, hash: &Hash) -> Vec<Block> {
        let dependents = match self.store.erase(hash) {
            Some(record) => record.into_dependents(),
            None => Vec::new(),
        };
        debug_assert_eq!(invariants::check_all(&self.store), Ok(()));
        dependents
    }

    /// Missing hashes that should be fetched from peers now.
    ///
    /// Fires when the distinct-gap count or the oldest gap's age crosses
    /// its configured threshold; selects stalest-first, capped at
    /// `max_fetch_batch`, skipping hashes already requested within the
    /// backoff window. Selected hashes have their request time stamped so
    /// repeated evaluation does not storm the same peer fetch.
    pub fn fetch_candidates(&mut self, now: Timestamp) -> Vec<Hash> {
        let count_hit = self.store.len() >= self.config.gap_count_threshold;
        let age_hit = self
            .store
            .oldest()
            .is_some_and(|(_, arrival)| now.saturating_sub(arrival) >= self.config.stale_after_ms);
        if !count_hit && !age_hit {
            return Vec::new();
        }

        let stalest_first: Vec<Hash> = self
            .store
            .iter_oldest_first()
            .map(|record| record.missing_hash)
            .collect();

        let mut selected = Vec::new();
        for hash in stalest_first {
            if selected.len() >= self.config.max_fetch_batch {
                break;
            }
            let Some(record) = self.store.get_mut(&hash) else {
                continue;
            };
            let due = record
                .last_requested
                .map_or(true, |at| now.saturating_sub(at) >= self.config.fetch_backoff_ms);
            if due {
                record.last_requested = Some(now);
                selected.push(hash);
            }
        }
        selected
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.store.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Arrival timestamp of the stalest gap.
    pub fn oldest_arrival(&self) -> Option<Timestamp> {
        self.store.oldest().map(|(_, arrival)| arrival)
    }

    pub fn stats(&self, now: Timestamp) -> GapStats {
        GapStats {
            records: self.store.len(),
            dependents: self
                .store
                .iter_oldest_first()
                .map(|record| record.dependent_count())
                .sum(),
            oldest_age_ms: self
                .store
                .oldest()
                .map(|(_, arrival)| now.saturating_sub(arrival)),
        }
    }
}
