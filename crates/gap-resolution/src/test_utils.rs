//! Test support: deterministic clock, recording bootstrap sink, and
//! block-building helpers. Used by this crate's unit tests and by the
//! workspace test suite.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::Timestamp;
use crate::ports::outbound::{BootstrapRequester, TimeSource};
use shared_types::{
    Account, Block, ChangeBlock, Hash, OpenBlock, ReceiveBlock, SendBlock, U256,
};

/// Settable time source for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Timestamp) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Bootstrap sink that records every requested hash.
#[derive(Debug, Default)]
pub struct RecordingBootstrap {
    requests: Mutex<Vec<Hash>>,
}

impl RecordingBootstrap {
    /// All hashes requested so far, in order.
    pub fn requests(&self) -> Vec<Hash> {
        self.requests.lock().clone()
    }
}

impl BootstrapRequester for RecordingBootstrap {
    fn request_fetch(&self, missing: Hash) {
        self.requests.lock().push(missing);
    }
}

/// An account id from a repeated byte.
pub fn account(byte: u8) -> Account {
    [byte; 32]
}

/// A send leaving `balance` behind on the sender's chain.
pub fn send_block(previous: Hash, destination: Account, balance: u64) -> Block {
    Block::Send(SendBlock {
        previous,
        destination,
        balance: U256::from(balance),
        signature: [1; 64],
        work: 1,
    })
}

/// An open block funding `account` from `source`.
pub fn open_block(source: Hash, account: Account) -> Block {
    Block::Open(OpenBlock {
        source,
        representative: account,
        account,
        signature: [1; 64],
        work: 1,
    })
}

/// A receive crediting `source` onto the chain headed by `previous`.
pub fn receive_block(previous: Hash, source: Hash) -> Block {
    Block::Receive(ReceiveBlock {
        previous,
        source,
        signature: [1; 64],
        work: 1,
    })
}

/// A change block rotating to `representative`.
pub fn change_block(previous: Hash, representative: Account) -> Block {
    Block::Change(ChangeBlock {
        previous,
        representative,
        signature: [1; 64],
        work: 1,
    })
}
