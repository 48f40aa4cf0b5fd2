//! # Gap Resolution
//!
//! The gap cache and dependency-resolution subsystem of an account-chain
//! ledger node. Blocks arrive from many peers out of order, duplicated, or
//! referencing predecessors the node has never seen; this subsystem keeps
//! the node making forward progress anyway:
//!
//! 1. detects that an incoming block cannot attach (missing previous or
//!    source block),
//! 2. remembers the missing dependency and the blocks waiting on it,
//! 3. deduplicates repeated reports while refreshing their recency,
//! 4. signals the bootstrap layer to fetch dependencies that persist, and
//! 5. when the missing block finally arrives, recursively re-applies
//!    every block that was waiting on it.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Record Uniqueness | One live record per missing hash |
//! | 2 | Arrival Monotonicity | Refreshes never move arrival backwards |
//! | 3 | Dual Index Consistency | Hash and arrival views always agree |
//! | 4 | Atomic Apply | A non-progress outcome mutates no ledger state |
//! | 5 | Bounded Cache | Capacity ceiling evicts the oldest record |
//! | 6 | Lock Discipline | Cache lock never held across ledger/network calls |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entry store, gap cache, closed outcome types
//! - `ports/` - Inbound API trait, outbound SPI traits (ledger, bootstrap, clock)
//! - `adapters/` - In-memory ledger for tests and single-process use
//! - `service.rs` - Block processor and recursive reattachment driver
//! - `config.rs` - Gap cache and bootstrap-trigger tunables
//!
//! ## Usage
//!
//! ```ignore
//! use gap_resolution::{BlockProcessorApi, BlockProcessorService, GapConfig};
//! use gap_resolution::adapters::MemoryLedger;
//! use gap_resolution::ports::outbound::{MonotonicClock, NullBootstrap};
//! use std::sync::Arc;
//!
//! let (ledger, _genesis) = MemoryLedger::with_genesis(account, balance);
//! let service = BlockProcessorService::new(
//!     GapConfig::default(),
//!     Arc::new(ledger),
//!     Arc::new(NullBootstrap),
//!     Arc::new(MonotonicClock::new()),
//! );
//!
//! for report in service.process_batch(blocks) {
//!     // Applied / Pending(missing) / Rejected(reason)
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

// Re-export key types for convenience
pub use config::GapConfig;
pub use domain::{
    ApplyOutcome, BlockReport, BlockStatus, DependencyRecord, DependencyStore, GapCache, GapStats,
    ProcessingMetrics, RejectReason, Timestamp,
};
pub use ports::inbound::BlockProcessorApi;
pub use ports::outbound::{BootstrapRequester, Ledger, MonotonicClock, NullBootstrap, TimeSource};
pub use service::BlockProcessorService;
