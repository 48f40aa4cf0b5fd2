//! # Multi-Node Convergence
//!
//! Two simulated nodes with independent ledgers and gap caches. Delivery
//! between them is explicit (no sockets): node A originates blocks, node B
//! receives them in adversarial orders and must converge on A's state.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gap_resolution::adapters::MemoryLedger;
    use gap_resolution::test_utils::{
        account, open_block, receive_block, send_block, ManualClock, RecordingBootstrap,
    };
    use gap_resolution::{BlockProcessorApi, BlockProcessorService, GapConfig};
    use shared_types::{Account, Block, Hash, U256};

    const GENESIS_BALANCE: u64 = 1_000_000;

    struct Node {
        service:
            Arc<BlockProcessorService<MemoryLedger, RecordingBootstrap, ManualClock>>,
        ledger: Arc<MemoryLedger>,
        bootstrap: Arc<RecordingBootstrap>,
        clock: Arc<ManualClock>,
        genesis_hash: Hash,
    }

    impl Node {
        fn new(config: GapConfig) -> Self {
            let (ledger, genesis_hash) =
                MemoryLedger::with_genesis(genesis_account(), U256::from(GENESIS_BALANCE));
            let ledger = Arc::new(ledger);
            let bootstrap = Arc::new(RecordingBootstrap::default());
            let clock = Arc::new(ManualClock::new(1));
            let service = Arc::new(BlockProcessorService::new(
                config,
                Arc::clone(&ledger),
                Arc::clone(&bootstrap),
                Arc::clone(&clock),
            ));
            Self {
                service,
                ledger,
                bootstrap,
                clock,
                genesis_hash,
            }
        }

        fn deliver(&self, block: &Block) {
            self.service.process(block.clone());
        }

        fn balance(&self, account: &Account) -> Option<U256> {
            self.ledger.balance(account)
        }
    }

    fn genesis_account() -> Account {
        account(0xAA)
    }

    fn quiet_config() -> GapConfig {
        GapConfig {
            gap_count_threshold: usize::MAX,
            stale_after_ms: u64::MAX,
            ..GapConfig::for_testing()
        }
    }

    #[test]
    fn test_reordered_delivery_converges() {
        // Node A holds genesis -> send1 -> send2; node B receives send2
        // first, then send1.
        let node_a = Node::new(quiet_config());
        let node_b = Node::new(quiet_config());
        assert_eq!(node_a.genesis_hash, node_b.genesis_hash);

        let key = account(0xBB);
        let send1 = send_block(node_a.genesis_hash, key, GENESIS_BALANCE - 100);
        let send2 = send_block(send1.hash(), key, GENESIS_BALANCE - 200);
        node_a.deliver(&send1);
        node_a.deliver(&send2);

        node_b.deliver(&send2);
        assert_eq!(
            node_b.balance(&genesis_account()),
            Some(U256::from(GENESIS_BALANCE))
        );
        assert!(node_b.service.gap_contains(&send1.hash()));

        node_b.deliver(&send1);
        assert_eq!(node_b.service.gap_count(), 0);
        assert_eq!(
            node_b.balance(&genesis_account()),
            node_a.balance(&genesis_account())
        );
        assert_eq!(
            node_b.ledger.head(&genesis_account()),
            node_a.ledger.head(&genesis_account())
        );
    }

    #[test]
    fn test_gap_bootstrap_round_trip() {
        // Node B's gap goes stale, B signals a fetch, and delivery of the
        // fetched block (simulating the bootstrap response) converges B.
        let config = GapConfig {
            gap_count_threshold: usize::MAX,
            stale_after_ms: 100,
            ..GapConfig::for_testing()
        };
        let node_a = Node::new(quiet_config());
        let node_b = Node::new(config);

        let key = account(0xBB);
        let send1 = send_block(node_a.genesis_hash, key, GENESIS_BALANCE - 100);
        let send2 = send_block(send1.hash(), key, GENESIS_BALANCE - 200);
        node_a.deliver(&send1);
        node_a.deliver(&send2);

        // B only hears about send2.
        node_b.deliver(&send2);
        node_b.clock.advance(150);
        node_b.service.sweep();

        // B asked the network for exactly the missing predecessor.
        assert_eq!(node_b.bootstrap.requests(), vec![send1.hash()]);

        // The bootstrap layer answers by delivering the fetched block.
        node_b.deliver(&send1);
        assert_eq!(node_b.service.gap_count(), 0);
        assert_eq!(
            node_b.balance(&genesis_account()),
            node_a.balance(&genesis_account())
        );
    }

    #[test]
    fn test_full_account_lifecycle_out_of_order() {
        // genesis -> send1 -> send2 on the genesis chain; open -> receive
        // on the destination chain. Node B gets everything in the worst
        // order and still converges account by account.
        let node_a = Node::new(quiet_config());
        let node_b = Node::new(quiet_config());

        let key = account(0xBB);
        let send1 = send_block(node_a.genesis_hash, key, GENESIS_BALANCE - 100);
        let open = open_block(send1.hash(), key);
        let send2 = send_block(send1.hash(), key, GENESIS_BALANCE - 250);
        let receive = receive_block(open.hash(), send2.hash());

        for block in [&send1, &open, &send2, &receive] {
            node_a.deliver(block);
        }
        assert_eq!(node_a.balance(&key), Some(U256::from(250u64)));

        for block in [&receive, &send2, &open, &send1] {
            node_b.deliver(block);
        }

        assert_eq!(node_b.service.gap_count(), 0);
        assert_eq!(node_b.balance(&key), node_a.balance(&key));
        assert_eq!(
            node_b.balance(&genesis_account()),
            node_a.balance(&genesis_account())
        );
        assert_eq!(node_b.ledger.block_count(), node_a.ledger.block_count());
    }
}
