//! Consistency invariants for the dependency entry store.
//!
//! Violations are programming errors, not runtime conditions; the service
//! checks these in debug builds only.

use super::store::DependencyStore;

/// INVARIANT-1: Index cardinality
/// Both views of the store contain exactly the same number of records.
pub fn invariant_index_cardinality(store: &DependencyStore) -> bool {
    store.len() == store.arrival_index_len()
}

/// INVARIANT-2: Index agreement
/// Every key in the arrival index matches its record's arrival and seq.
pub fn invariant_index_agreement(store: &DependencyStore) -> bool {
    store.arrival_keys().all(|(hash, arrival, seq)| {
        store
            .get(&hash)
            .is_some_and(|record| record.arrival == arrival && record.seq == seq)
    })
}

/// Consistency check result.
#[derive(Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    IndexCardinalityMismatch { by_hash: usize, by_arrival: usize },
    IndexDisagreement,
}

/// Check all store invariants.
pub fn check_all(store: &DependencyStore) -> Result<(), InvariantViolation> {
    if !invariant_index_cardinality(store) {
        return Err(InvariantViolation::IndexCardinalityMismatch {
            by_hash: store.len(),
            by_arrival: store.arrival_index_len(),
        });
    }

    if !invariant_index_agreement(store) {
        return Err(InvariantViolation::IndexDisagreement);
    }

    Ok(())
}
