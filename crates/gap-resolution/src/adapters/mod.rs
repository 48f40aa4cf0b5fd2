//! Adapters implementing the outbound ports.

pub mod memory_ledger;

pub use memory_ledger::MemoryLedger;
