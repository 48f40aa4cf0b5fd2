//! Domain entities for dependency tracking.

use shared_types::{Block, Hash};
use std::collections::BTreeMap;

/// A millisecond timestamp from a process-wide monotonic clock.
pub type Timestamp = u64;

/// One live gap: a block hash that is absent from the ledger together with
/// the blocks waiting on it.
///
/// Exactly one record exists per missing hash; repeated reports refresh
/// `arrival` in place rather than creating a second record.
#[derive(Debug, Clone)]
pub struct DependencyRecord {
    /// The block hash that is absent from the ledger.
    pub missing_hash: Hash,
    /// Most recent observation that the hash is missing. Never decreases.
    pub arrival: Timestamp,
    /// Insertion counter, breaks arrival ties deterministically.
    pub(crate) seq: u64,
    /// When a peer fetch was last signalled for this hash, for backoff.
    pub(crate) last_requested: Option<Timestamp>,
    /// Blocks blocked on this hash, keyed by their own hash so a
    /// re-reported dependent is stored once.
    pub(crate) dependents: BTreeMap<Hash, Block>,
}

impl DependencyRecord {
    pub(crate) fn new(missing_hash: Hash, arrival: Timestamp, seq: u64) -> Self {
        Self {
            missing_hash,
            arrival,
            seq,
            last_requested: None,
            dependents: BTreeMap::new(),
        }
    }

    /// Number of distinct blocks waiting on this hash.
    pub fn dependent_count(&self) -> usize {
        self.dependents.len()
    }

    /// The waiting blocks, in dependent-hash order.
    pub fn dependents(&self) -> impl Iterator<Item = &Block> {
        self.dependents.values()
    }

    /// Consumes the record, yielding the waiting blocks for retry.
    pub fn into_dependents(self) -> Vec<Block> {
        self.dependents.into_values().collect()
    }
}
