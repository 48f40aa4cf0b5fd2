//! # Block Processing Service
//!
//! Applies validated blocks to the ledger, classifies each attempt, and
//! drives recursive reattachment of blocks that were waiting on a missing
//! dependency.
//!
//! ## Data Flow
//!
//! ```text
//! network / wallet ──blocks──→ process_batch
//!                                  │ apply (ledger txn, atomic)
//!                    ┌─────────────┼──────────────┐
//!                 Progress      Gap{Previous,   Rejected
//!                    │            Source}          │
//!            resolve(hash),     add(block,      discard
//!            retry dependents   missing) +
//!                               fetch policy ──→ bootstrap layer
//! ```
//!
//! ## Locking Discipline
//!
//! The gap cache sits behind one mutex. The ledger apply happens before
//! the lock is taken; bootstrap fetches fire after it is released. No
//! lock is ever held across ledger or network calls.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::GapConfig;
use crate::domain::{
    ApplyOutcome, BlockReport, BlockStatus, GapCache, GapStats, ProcessingMetrics, RejectReason,
};
use crate::ports::inbound::BlockProcessorApi;
use crate::ports::outbound::{BootstrapRequester, Ledger, TimeSource};
use shared_types::{Block, Hash};

/// Block processor and recursive reattachment driver.
///
/// One instance exists per node process, owning that node's gap cache.
/// Tests construct independent instances with their own adapters.
///
/// ## Thread Safety
///
/// Safe to share across threads via `Arc`; the gap cache is guarded by a
/// single mutex whose hold time is bounded by O(log n) map operations.
pub struct BlockProcessorService<L, B, T>
where
    L: Ledger,
    B: BootstrapRequester,
    T: TimeSource,
{
    /// Authoritative block store.
    ledger: Arc<L>,
    /// Fire-and-forget fetch signal sink.
    bootstrap: Arc<B>,
    /// Process-wide monotonic clock.
    clock: Arc<T>,
    /// Missing-dependency bookkeeping.
    gaps: Mutex<GapCache>,
    /// Processing counters.
    metrics: RwLock<ProcessingMetrics>,
}

impl<L, B, T> BlockProcessorService<L, B, T>
where
    L: Ledger,
    B: BootstrapRequester,
    T: TimeSource,
{
    pub fn new(config: GapConfig, ledger: Arc<L>, bootstrap: Arc<B>, clock: Arc<T>) -> Self {
        Self {
            ledger,
            bootstrap,
            clock,
            gaps: Mutex::new(GapCache::new(config)),
            metrics: RwLock::new(ProcessingMetrics::default()),
        }
    }

    /// Snapshot of the processing counters.
    pub fn metrics(&self) -> ProcessingMetrics {
        self.metrics.read().clone()
    }

    /// Snapshot of gap cache diagnostics.
    pub fn gap_stats(&self) -> GapStats {
        let now = self.clock.now();
        self.gaps.lock().stats(now)
    }

    /// Attempt one block: ledger apply first, gap side effects after the
    /// transaction has finished. Returns the report plus any cached
    /// dependents unblocked by a successful apply.
    fn attempt(&self, block: Block) -> (BlockReport, Vec<Block>) {
        let hash = block.hash();
        match self.ledger.apply(&block) {
            ApplyOutcome::Progress => {
                let freed = self.gaps.lock().resolve(&hash);
                debug!(hash = ?&hash[..4], unblocked = freed.len(), "block applied");
                let mut metrics = self.metrics.write();
                metrics.applied += 1;
                metrics.reattached += freed.len() as u64;
                (
                    BlockReport {
                        hash,
                        status: BlockStatus::Applied,
                    },
                    freed,
                )
            }
            ApplyOutcome::GapPrevious(missing) => (self.on_gap(hash, block, missing, "previous"), Vec::new()),
            ApplyOutcome::GapSource(missing) => (self.on_gap(hash, block, missing, "source"), Vec::new()),
            ApplyOutcome::Rejected(reason) => {
                // An Old block is, by definition, present in the ledger. A
                // gap record for its hash can still exist if a racing
                // worker applied it between our failed apply and our
                // gaps.add; drain that record here so its dependents are
                // not stranded until eviction.
                let freed = if reason == RejectReason::Old {
                    self.gaps.lock().resolve(&hash)
                } else {
                    Vec::new()
                };
                debug!(hash = ?&hash[..4], %reason, unblocked = freed.len(), "block rejected");
                let mut metrics = self.metrics.write();
                metrics.rejected += 1;
                metrics.reattached += freed.len() as u64;
                (
                    BlockReport {
                        hash,
                        status: BlockStatus::Rejected(reason),
                    },
                    freed,
                )
            }
        }
    }

    fn on_gap(&self, hash: Hash, block: Block, missing: Hash, kind: &'static str) -> BlockReport {
        let now = self.clock.now();
        let fetches = {
            let mut gaps = self.gaps.lock();
            gaps.add(block, missing, now);
            gaps.fetch_candidates(now)
        };
        debug!(hash = ?&hash[..4], missing = ?&missing[..4], kind, "block gapped");
        self.metrics.write().pending += 1;
        self.dispatch_fetches(fetches);
        BlockReport {
            hash,
            status: BlockStatus::Pending(missing),
        }
    }

    fn dispatch_fetches(&self, fetches: Vec<Hash>) {
        if fetches.is_empty() {
            return;
        }
        self.metrics.write().fetches_signalled += fetches.len() as u64;
        for missing in fetches {
            info!(missing = ?&missing[..4], "signalling bootstrap fetch");
            self.bootstrap.request_fetch(missing);
        }
    }
}

impl<L, B, T> BlockProcessorApi for BlockProcessorService<L, B, T>
where
    L: Ledger,
    B: BootstrapRequester,
    T: TimeSource,
{
    fn process(&self, block: Block) -> BlockStatus {
        let (report, freed) = self.attempt(block);
        // Dependents unblocked by this block are retried as a side effect;
        // only the supplied block's own status is returned.
        let mut queue: VecDeque<Block> = freed.into();
        while let Some(next) = queue.pop_front() {
            let (_, more) = self.attempt(next);
            queue.extend(more);
        }
        report.status
    }

    fn process_batch(&self, blocks: Vec<Block>) -> Vec<BlockReport> {
        let mut reports = Vec::with_capacity(blocks.len());
        // Explicit worklist instead of recursion: stack depth stays bounded
        // under long dependency chains, and the loop terminates once the
        // queue drains.
        let mut queue: VecDeque<Block> = blocks.into_iter().collect();
        while let Some(block) = queue.pop_front() {
            let (report, freed) = self.attempt(block);
            queue.extend(freed);
            reports.push(report);
        }
        reports
    }

    fn sweep(&self) {
        let now = self.clock.now();
        let fetches = self.gaps.lock().fetch_candidates(now);
        self.dispatch_fetches(fetches);
    }

    fn gap_count(&self) -> usize {
        self.gaps.lock().len()
    }

    fn gap_contains(&self, hash: &Hash) -> bool {
        self.gaps.lock().contains(hash)
    }
}
