//! Closed outcome and status types for block processing.
//!
//! Every consumer switches over these exhaustively; there is no open-ended
//! error code anywhere on the processing path.

use serde::{Deserialize, Serialize};
use shared_types::Hash;
use thiserror::Error;

use super::entities::Timestamp;

/// Why a block was rejected outright. Rejected blocks are discarded and
/// never retried; no gap is recorded for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    /// The block is already present in the ledger (stale duplicate).
    #[error("block already present in the ledger")]
    Old,
    /// The block signature did not verify.
    #[error("bad block signature")]
    BadSignature,
    /// The attached proof-of-work is below the required difficulty.
    #[error("insufficient proof of work")]
    InsufficientWork,
    /// The block's predecessor already has a different successor, or the
    /// account it opens already exists.
    #[error("block forks an existing chain")]
    Fork,
    /// A send leaving a balance larger than the account holds.
    #[error("send exceeds the available balance")]
    Overspend,
    /// The referenced source is not receivable by this account.
    #[error("source is not receivable by this account")]
    Unreceivable,
}

/// Result of attempting to apply one block to the ledger.
///
/// Exactly one outcome is produced per attempt. On `Progress` the ledger
/// transaction has committed; on every other outcome no ledger mutation is
/// observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Block applied; the ledger advanced.
    Progress,
    /// The account's previous block is absent from the ledger.
    GapPrevious(Hash),
    /// The referenced send/source block is absent from the ledger.
    GapSource(Hash),
    /// The block is invalid, conflicting, or stale.
    Rejected(RejectReason),
}

/// Per-block status reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatus {
    /// Applied to the ledger.
    Applied,
    /// Queued in the gap cache, waiting on the named missing hash.
    Pending(Hash),
    /// Discarded; will not be retried.
    Rejected(RejectReason),
}

/// One processed block and what became of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReport {
    pub hash: Hash,
    pub status: BlockStatus,
}

impl BlockReport {
    pub fn applied(&self) -> bool {
        self.status == BlockStatus::Applied
    }
}

/// Gap cache snapshot for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapStats {
    /// Distinct missing hashes currently tracked.
    pub records: usize,
    /// Total dependent blocks held across all records.
    pub dependents: usize,
    /// Age of the stalest gap, if any.
    pub oldest_age_ms: Option<Timestamp>,
}

/// Processing counters for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingMetrics {
    /// Blocks applied to the ledger.
    pub applied: u64,
    /// Blocks parked in the gap cache.
    pub pending: u64,
    /// Blocks rejected outright.
    pub rejected: u64,
    /// Cached dependents retried after their dependency arrived.
    pub reattached: u64,
    /// Bootstrap fetches signalled to the network layer.
    pub fetches_signalled: u64,
}
