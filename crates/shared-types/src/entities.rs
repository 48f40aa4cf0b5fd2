//! # Core Ledger Entities
//!
//! Defines the account-chain block structures. Every account owns its own
//! chain of blocks; a block is one of four kinds:
//!
//! - **send**: debits the sender's account, naming a destination
//! - **receive**: credits a previously sent amount onto an existing chain
//! - **open**: creates an account chain by receiving its first amount
//! - **change**: rotates the account's representative
//!
//! Signatures and proof-of-work are carried but not verified here; the
//! signature-verification subsystem runs upstream of block processing.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte block hash (SHA-256).
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// An account identifier (its public key).
pub type Account = PublicKey;

/// A 64-bit proof-of-work nonce attached to every block.
pub type Work = u64;

/// A ledger balance or transfer amount in raw units.
pub type Amount = U256;

/// Debits an account, leaving `balance` behind and making the difference
/// receivable by `destination`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendBlock {
    /// Hash of the sender's current head block.
    pub previous: Hash,
    /// Account entitled to receive the sent amount.
    pub destination: Account,
    /// Sender's balance *after* this send; the amount transferred is the
    /// difference from the previous balance.
    pub balance: Amount,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    pub work: Work,
}

/// Credits a pending send onto an already-open account chain.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveBlock {
    /// Hash of the receiver's current head block.
    pub previous: Hash,
    /// Hash of the send block being received.
    pub source: Hash,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    pub work: Work,
}

/// First block of an account chain; receives the send that funds the account.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBlock {
    /// Hash of the send block funding this account.
    pub source: Hash,
    /// Initial representative for the account.
    pub representative: Account,
    /// The account being opened.
    pub account: Account,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    pub work: Work,
}

/// Rotates an account's representative without moving value.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    /// Hash of the account's current head block.
    pub previous: Hash,
    /// New representative for the account.
    pub representative: Account,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
    pub work: Work,
}

/// Discriminant of the four block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Send,
    Receive,
    Open,
    Change,
}

/// A signed ledger operation belonging to one account's chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
}

impl Block {
    /// Compute the block hash.
    ///
    /// The hash covers a kind tag plus every chain-linkage and value field,
    /// but not the signature or work (both attest to the hash, they do not
    /// feed it).
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        match self {
            Block::Send(b) => {
                hasher.update([0u8]);
                hasher.update(b.previous);
                hasher.update(b.destination);
                let mut balance = [0u8; 32];
                b.balance.to_big_endian(&mut balance);
                hasher.update(balance);
            }
            Block::Receive(b) => {
                hasher.update([1u8]);
                hasher.update(b.previous);
                hasher.update(b.source);
            }
            Block::Open(b) => {
                hasher.update([2u8]);
                hasher.update(b.source);
                hasher.update(b.representative);
                hasher.update(b.account);
            }
            Block::Change(b) => {
                hasher.update([3u8]);
                hasher.update(b.previous);
                hasher.update(b.representative);
            }
        }
        hasher.finalize().into()
    }

    /// The kind discriminant of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Send(_) => BlockKind::Send,
            Block::Receive(_) => BlockKind::Receive,
            Block::Open(_) => BlockKind::Open,
            Block::Change(_) => BlockKind::Change,
        }
    }

    /// Hash of the predecessor block on the same account chain.
    ///
    /// `None` for open blocks, which start a chain.
    pub fn previous(&self) -> Option<Hash> {
        match self {
            Block::Send(b) => Some(b.previous),
            Block::Receive(b) => Some(b.previous),
            Block::Open(_) => None,
            Block::Change(b) => Some(b.previous),
        }
    }

    /// Hash of the referenced send block, for receive and open blocks.
    pub fn source(&self) -> Option<Hash> {
        match self {
            Block::Receive(b) => Some(b.source),
            Block::Open(b) => Some(b.source),
            Block::Send(_) | Block::Change(_) => None,
        }
    }
}
