//! In-memory account-chain ledger implementing the [`Ledger`] port.
//!
//! Carries enough account-chain semantics to produce every
//! [`ApplyOutcome`]: per-account heads and balances, a receivable table
//! for in-flight sends, and fork/duplicate detection. Production nodes
//! substitute a durable transactional store; the port contract is the
//! same.
//!
//! Validation runs to completion before any mutation, so a non-`Progress`
//! outcome leaves the state untouched.

use parking_lot::RwLock;
use shared_types::{Account, Amount, Block, ChangeBlock, Hash, OpenBlock, ReceiveBlock, SendBlock};
use std::collections::HashMap;

use crate::domain::{ApplyOutcome, RejectReason};
use crate::ports::outbound::Ledger;

#[derive(Debug, Clone)]
struct AccountInfo {
    head: Hash,
    balance: Amount,
    representative: Account,
    block_count: u64,
}

#[derive(Debug, Clone)]
struct Receivable {
    destination: Account,
    amount: Amount,
}

#[derive(Debug, Default)]
struct LedgerState {
    /// Open accounts and their chain heads.
    accounts: HashMap<Account, AccountInfo>,
    /// Every applied block by hash.
    blocks: HashMap<Hash, Block>,
    /// Which account chain each applied block belongs to.
    owners: HashMap<Hash, Account>,
    /// Sends not yet received, by send hash.
    receivable: HashMap<Hash, Receivable>,
}

impl LedgerState {
    /// Owner, head, and balance of the chain `previous` belongs to.
    fn chain_info(&self, previous: &Hash) -> Option<(Account, Hash, Amount)> {
        let owner = *self.owners.get(previous)?;
        let info = self.accounts.get(&owner)?;
        Some((owner, info.head, info.balance))
    }

    fn advance(&mut self, owner: Account, hash: Hash, block: Block, balance: Amount) {
        if let Some(info) = self.accounts.get_mut(&owner) {
            info.head = hash;
            info.balance = balance;
            info.block_count += 1;
        }
        self.blocks.insert(hash, block);
        self.owners.insert(hash, owner);
    }
}

/// In-memory ledger for unit and integration tests.
///
/// Interior mutability behind a single `RwLock` keeps `apply` atomic and
/// the adapter `Send + Sync`, as the port requires.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger seeded with a genesis account holding `balance`.
    ///
    /// Returns the ledger and the genesis block hash, which is the head of
    /// the genesis account's chain.
    pub fn with_genesis(account: Account, balance: Amount) -> (Self, Hash) {
        let genesis = Block::Open(OpenBlock {
            source: account,
            representative: account,
            account,
            signature: [0; 64],
            work: 0,
        });
        let hash = genesis.hash();

        let ledger = Self::new();
        {
            let mut state = ledger.state.write();
            state.accounts.insert(
                account,
                AccountInfo {
                    head: hash,
                    balance,
                    representative: account,
                    block_count: 1,
                },
            );
            state.blocks.insert(hash, genesis);
            state.owners.insert(hash, account);
        }
        (ledger, hash)
    }

    /// Current balance of `account`, if open.
    pub fn balance(&self, account: &Account) -> Option<Amount> {
        self.state.read().accounts.get(account).map(|a| a.balance)
    }

    /// Chain head of `account`, if open.
    pub fn head(&self, account: &Account) -> Option<Hash> {
        self.state.read().accounts.get(account).map(|a| a.head)
    }

    /// Representative of `account`, if open.
    pub fn representative(&self, account: &Account) -> Option<Account> {
        self.state
            .read()
            .accounts
            .get(account)
            .map(|a| a.representative)
    }

    /// Total applied blocks.
    pub fn block_count(&self) -> usize {
        self.state.read().blocks.len()
    }

    /// Full account state (head, balance, block count) for byte-for-byte
    /// before/after comparisons in tests.
    pub fn account_state(&self, account: &Account) -> Option<(Hash, Amount, u64)> {
        self.state
            .read()
            .accounts
            .get(account)
            .map(|a| (a.head, a.balance, a.block_count))
    }

    fn apply_send(state: &mut LedgerState, hash: Hash, send: &SendBlock) -> ApplyOutcome {
        let Some((owner, head, balance)) = state.chain_info(&send.previous) else {
            return ApplyOutcome::GapPrevious(send.previous);
        };
        if head != send.previous {
            return ApplyOutcome::Rejected(RejectReason::Fork);
        }
        if send.balance > balance {
            return ApplyOutcome::Rejected(RejectReason::Overspend);
        }
        let amount = balance - send.balance;
        state.advance(owner, hash, Block::Send(send.clone()), send.balance);
        state.receivable.insert(
            hash,
            Receivable {
                destination: send.destination,
                amount,
            },
        );
        ApplyOutcome::Progress
    }

    fn apply_receive(state: &mut LedgerState, hash: Hash, receive: &ReceiveBlock) -> ApplyOutcome {
        let Some((owner, head, balance)) = state.chain_info(&receive.previous) else {
            return ApplyOutcome::GapPrevious(receive.previous);
        };
        if head != receive.previous {
            return ApplyOutcome::Rejected(RejectReason::Fork);
        }
        if !state.blocks.contains_key(&receive.source) {
            return ApplyOutcome::GapSource(receive.source);
        }
        let amount = match state.receivable.get(&receive.source) {
            Some(pending) if pending.destination == owner => pending.amount,
            _ => return ApplyOutcome::Rejected(RejectReason::Unreceivable),
        };
        state.receivable.remove(&receive.source);
        state.advance(owner, hash, Block::Receive(receive.clone()), balance + amount);
        ApplyOutcome::Progress
    }

    fn apply_open(state: &mut LedgerState, hash: Hash, open: &OpenBlock) -> ApplyOutcome {
        if !state.blocks.contains_key(&open.source) {
            return ApplyOutcome::GapSource(open.source);
        }
        if state.accounts.contains_key(&open.account) {
            return ApplyOutcome::Rejected(RejectReason::Fork);
        }
        let amount = match state.receivable.get(&open.source) {
            Some(pending) if pending.destination == open.account => pending.amount,
            _ => return ApplyOutcome::Rejected(RejectReason::Unreceivable),
        };
        state.receivable.remove(&open.source);
        state.accounts.insert(
            open.account,
            AccountInfo {
                head: hash,
                balance: amount,
                representative: open.representative,
                block_count: 1,
            },
        );
        state.blocks.insert(hash, Block::Open(open.clone()));
        state.owners.insert(hash, open.account);
        ApplyOutcome::Progress
    }

    fn apply_change(state: &mut LedgerState, hash: Hash, change: &ChangeBlock) -> ApplyOutcome {
        let Some((owner, head, balance)) = state.chain_info(&change.previous) else {
            return ApplyOutcome::GapPrevious(change.previous);
        };
        if head != change.previous {
            return ApplyOutcome::Rejected(RejectReason::Fork);
        }
        if let Some(info) = state.accounts.get_mut(&owner) {
            info.representative = change.representative;
        }
        state.advance(owner, hash, Block::Change(change.clone()), balance);
        ApplyOutcome::Progress
    }
}

impl Ledger for MemoryLedger {
    fn exists(&self, hash: &Hash) -> bool {
        self.state.read().blocks.contains_key(hash)
    }

    fn apply(&self, block: &Block) -> ApplyOutcome {
        let mut state = self.state.write();
        let hash = block.hash();
        if state.blocks.contains_key(&hash) {
            return ApplyOutcome::Rejected(RejectReason::Old);
        }
        match block {
            Block::Send(send) => Self::apply_send(&mut state, hash, send),
            Block::Receive(receive) => Self::apply_receive(&mut state, hash, receive),
            Block::Open(open) => Self::apply_open(&mut state, hash, open),
            Block::Change(change) => Self::apply_change(&mut state, hash, change),
        }
    }
}
