//! # Shared Ledger Types
//!
//! Core entities shared across Account-Chain subsystems: hashes, accounts,
//! and the four block kinds that make up a per-account chain.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `Account`, `PublicKey`, `Signature`, `Work`
//! - **Chain**: `Block`, `SendBlock`, `ReceiveBlock`, `OpenBlock`, `ChangeBlock`

pub mod entities;

pub use entities::{
    Account, Amount, Block, BlockKind, ChangeBlock, Hash, OpenBlock, PublicKey, ReceiveBlock,
    SendBlock, Signature, Work, U256,
};
