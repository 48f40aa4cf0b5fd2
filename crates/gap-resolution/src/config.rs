//! # Gap Resolution Configuration
//!
//! Tunables for the gap cache and its bootstrap-trigger policy. The exact
//! thresholds are deployment policy, not protocol; defaults are
//! conservative enough not to storm peers on a briefly reordered stream.

use serde::{Deserialize, Serialize};

/// Gap cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GapConfig {
    /// Capacity ceiling on distinct missing hashes. The oldest record is
    /// evicted when exceeded, bounding memory under adversarial flooding.
    pub max_records: usize,

    /// Distinct-gap count at which bootstrap fetches start firing.
    pub gap_count_threshold: usize,

    /// Age of the oldest gap, in milliseconds, at which bootstrap fetches
    /// start firing regardless of count.
    pub stale_after_ms: u64,

    /// Minimum interval between fetch signals for the same missing hash.
    pub fetch_backoff_ms: u64,

    /// Maximum missing hashes signalled per policy evaluation.
    pub max_fetch_batch: usize,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            max_records: 16_384,
            gap_count_threshold: 256,
            stale_after_ms: 5_000,
            fetch_backoff_ms: 15_000,
            max_fetch_batch: 16,
        }
    }
}

impl GapConfig {
    /// Create a config for testing (small values, tight thresholds).
    pub fn for_testing() -> Self {
        Self {
            max_records: 64,
            gap_count_threshold: 4,
            stale_after_ms: 50,
            fetch_backoff_ms: 100,
            max_fetch_batch: 4,
        }
    }
}
