//! Outbound (driven) ports for the gap-resolution subsystem.
//!
//! These traits define what this library requires the host node to
//! implement: the ledger, the bootstrap layer, and a clock.

use crate::domain::{ApplyOutcome, Timestamp};
use shared_types::{Block, Hash};
use std::time::Instant;

/// The authoritative block store and account-state machine.
///
/// Production: a transactional store over durable storage.
/// Testing: `MemoryLedger` (adapters/memory_ledger.rs).
pub trait Ledger: Send + Sync {
    /// Check whether a block with this hash has been applied.
    fn exists(&self, hash: &Hash) -> bool;

    /// Attempt to apply one validated block.
    ///
    /// ## Atomicity Guarantee
    ///
    /// The implementation owns the transaction boundary: on `Progress` the
    /// change has committed; on any other outcome NO state mutation is
    /// observable. Callers never see a partially applied block.
    fn apply(&self, block: &Block) -> ApplyOutcome;
}

/// Fire-and-forget channel to the network/bootstrap layer.
///
/// Implementations must not block: the caller invokes this on the block
/// processing path and only *signals* that a dependency is worth fetching.
pub trait BootstrapRequester: Send + Sync {
    /// Ask the network layer to fetch `missing` from peers.
    fn request_fetch(&self, missing: Hash);
}

/// Bootstrap sink that drops every request, for nodes running without a
/// network layer and for tests that only exercise bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBootstrap;

impl BootstrapRequester for NullBootstrap {
    fn request_fetch(&self, _missing: Hash) {}
}

/// Time source for gap arrival stamps.
///
/// Must be non-decreasing across calls from any thread; arrival ordering
/// and fetch backoff both depend on it. Abstracted to allow testing with
/// deterministic time.
pub trait TimeSource: Send + Sync {
    /// Current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default monotonic time source: milliseconds since process start.
///
/// Built on `Instant` rather than wall time so the non-decreasing
/// requirement holds even across system clock adjustments.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}
