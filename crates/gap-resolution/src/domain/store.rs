//! # Dependency Entry Store
//!
//! A time-ordered, hash-indexed set of pending dependency records: two
//! synchronized views over one backing store.
//!
//! ## Data Structures
//!
//! - `by_hash`: O(1) membership, lookup, and erase by missing hash
//! - `by_arrival`: O(log n) oldest-first ordering (BTreeSet keyed by
//!   `(arrival, seq)`)
//!
//! ## Invariants Enforced
//!
//! - One live record per missing hash (`upsert` refreshes in place)
//! - `arrival` never decreases across refreshes (monotonic clamp)
//! - Arrival ties break by insertion order; a refreshed record keeps its
//!   original insertion position among equal arrivals

use super::entities::{DependencyRecord, Timestamp};
use shared_types::Hash;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

/// Key for the arrival-ordered view. Derived ordering compares `arrival`
/// first, then `seq`; `hash` only disambiguates set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ArrivalKey {
    arrival: Timestamp,
    seq: u64,
    hash: Hash,
}

/// Dual-indexed set of dependency records.
#[derive(Debug, Default)]
pub struct DependencyStore {
    by_hash: HashMap<Hash, DependencyRecord>,
    by_arrival: BTreeSet<ArrivalKey>,
    next_seq: u64,
}

impl DependencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record for `hash`, or refreshes the existing one.
    ///
    /// A refresh sets `arrival` to `max(now, previous arrival)` so the
    /// timestamp never moves backwards even if callers race on the clock,
    /// and keeps the record's original insertion `seq`.
    pub fn upsert(&mut self, hash: Hash, now: Timestamp) -> &mut DependencyRecord {
        match self.by_hash.entry(hash) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                let refreshed = now.max(record.arrival);
                if refreshed != record.arrival {
                    self.by_arrival.remove(&ArrivalKey {
                        arrival: record.arrival,
                        seq: record.seq,
                        hash,
                    });
                    record.arrival = refreshed;
                    self.by_arrival.insert(ArrivalKey {
                        arrival: refreshed,
                        seq: record.seq,
                        hash,
                    });
                }
                record
            }
            Entry::Vacant(entry) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.by_arrival.insert(ArrivalKey {
                    arrival: now,
                    seq,
                    hash,
                });
                entry.insert(DependencyRecord::new(hash, now, seq))
            }
        }
    }

    /// True if a record exists for `hash`.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Looks up a record by missing hash.
    pub fn get(&self, hash: &Hash) -> Option<&DependencyRecord> {
        self.by_hash.get(hash)
    }

    /// Mutable lookup for bookkeeping fields (`last_requested`,
    /// `dependents`). Callers must not touch `arrival` through this; the
    /// arrival index is only maintained by `upsert`.
    pub(crate) fn get_mut(&mut self, hash: &Hash) -> Option<&mut DependencyRecord> {
        self.by_hash.get_mut(hash)
    }

    /// Removes and returns the record for `hash`, if any.
    pub fn erase(&mut self, hash: &Hash) -> Option<DependencyRecord> {
        let record = self.by_hash.remove(hash)?;
        self.by_arrival.remove(&ArrivalKey {
            arrival: record.arrival,
            seq: record.seq,
            hash: *hash,
        });
        Some(record)
    }

    /// The record with the smallest arrival, or `None` if empty.
    pub fn oldest(&self) -> Option<(Hash, Timestamp)> {
        self.by_arrival.first().map(|key| (key.hash, key.arrival))
    }

    /// Removes and returns the oldest record.
    pub fn pop_oldest(&mut self) -> Option<DependencyRecord> {
        let key = self.by_arrival.pop_first()?;
        self.by_hash.remove(&key.hash)
    }

    /// Records in ascending arrival order.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.by_arrival
            .iter()
            .filter_map(|key| self.by_hash.get(&key.hash))
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub(crate) fn arrival_index_len(&self) -> usize {
        self.by_arrival.len()
    }

    pub(crate) fn arrival_keys(&self) -> impl Iterator<Item = (Hash, Timestamp, u64)> + '_ {
        self.by_arrival
            .iter()
            .map(|key| (key.hash, key.arrival, key.seq))
    }
}
