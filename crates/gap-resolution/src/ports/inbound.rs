//! Inbound (driving) port for the gap-resolution subsystem.

use crate::domain::{BlockReport, BlockStatus};
use shared_types::{Block, Hash};

/// Block-processing API offered to block sources: the network receive
/// handler, local wallet actions, and bootstrap replay.
///
/// Blocks reaching this API are assumed already signature- and
/// work-verified; this subsystem only decides whether they can attach to
/// the ledger yet.
pub trait BlockProcessorApi: Send + Sync {
    /// Process a single validated block.
    ///
    /// Returns the status of the supplied block. Cached dependents
    /// unblocked by it are retried as a side effect and surface only in
    /// metrics and logs; use [`process_batch`](Self::process_batch) when
    /// their reports are needed.
    fn process(&self, block: Block) -> BlockStatus;

    /// Process a sequence of validated blocks in caller-supplied order
    /// (typically oldest-dependency first).
    ///
    /// Returns one report per attempted block: the inputs plus any cached
    /// dependents retried after a dependency of theirs applied. Partial
    /// success is normal; blocks still gapped at the end keep their cache
    /// entries for future resolution.
    fn process_batch(&self, blocks: Vec<Block>) -> Vec<BlockReport>;

    /// Evaluate the bootstrap-trigger policy without processing a block.
    ///
    /// Intended for a periodic maintenance tick so that gaps that stop
    /// receiving new reports still get fetched once they go stale.
    fn sweep(&self);

    /// Number of distinct missing hashes currently tracked.
    fn gap_count(&self) -> usize;

    /// True if `hash` is currently tracked as missing.
    fn gap_contains(&self, hash: &Hash) -> bool;
}
