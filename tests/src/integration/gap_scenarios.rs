//! # Gap Cache Scenarios
//!
//! End-to-end behavior of the gap cache under out-of-order, duplicated,
//! and flooding block delivery, driven through the public
//! `BlockProcessorApi` rather than the domain types directly.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gap_resolution::adapters::MemoryLedger;
    use gap_resolution::test_utils::{
        account, open_block, send_block, ManualClock, RecordingBootstrap,
    };
    use gap_resolution::{
        BlockProcessorApi, BlockProcessorService, BlockStatus, GapCache, GapConfig, Ledger,
    };
    use shared_types::{Block, Hash, U256};

    const GENESIS_BALANCE: u64 = 1_000_000;

    struct Node {
        service:
            Arc<BlockProcessorService<MemoryLedger, RecordingBootstrap, ManualClock>>,
        ledger: Arc<MemoryLedger>,
        bootstrap: Arc<RecordingBootstrap>,
        clock: Arc<ManualClock>,
        genesis_hash: Hash,
    }

    /// One simulated node: its own ledger, gap cache, clock, and bootstrap sink.
    fn node(config: GapConfig) -> Node {
        let (ledger, genesis_hash) =
            MemoryLedger::with_genesis(account(0xAA), U256::from(GENESIS_BALANCE));
        let ledger = Arc::new(ledger);
        let bootstrap = Arc::new(RecordingBootstrap::default());
        let clock = Arc::new(ManualClock::new(1));
        let service = Arc::new(BlockProcessorService::new(
            config,
            Arc::clone(&ledger),
            Arc::clone(&bootstrap),
            Arc::clone(&clock),
        ));
        Node {
            service,
            ledger,
            bootstrap,
            clock,
            genesis_hash,
        }
    }

    fn quiet_config() -> GapConfig {
        GapConfig {
            gap_count_threshold: usize::MAX,
            stale_after_ms: u64::MAX,
            ..GapConfig::for_testing()
        }
    }

    // =========================================================================
    // CACHE BOOKKEEPING THROUGH THE PROCESSING PATH
    // =========================================================================

    #[test]
    fn test_gapped_block_is_recorded_under_missing_hash() {
        let node = node(quiet_config());
        let key = account(0xBB);
        let send1 = send_block(node.genesis_hash, key, 900);
        let send2 = send_block(send1.hash(), key, 800);

        let status = node.service.process(send2);
        assert_eq!(status, BlockStatus::Pending(send1.hash()));
        assert!(node.service.gap_contains(&send1.hash()));
        assert_eq!(node.service.gap_count(), 1);
    }

    #[test]
    fn test_duplicate_reports_never_grow_the_cache() {
        let node = node(quiet_config());
        let orphan = send_block([7; 32], account(0xBB), 1);

        for _ in 0..10 {
            node.clock.advance(5);
            node.service.process(orphan.clone());
        }
        assert_eq!(node.service.gap_count(), 1);
    }

    #[test]
    fn test_repeated_add_refreshes_arrival() {
        // Bookkeeping-level check of the recency-refresh property.
        let mut cache = GapCache::new(quiet_config());
        let orphan = send_block([7; 32], account(0xBB), 1);

        cache.add(orphan.clone(), [7; 32], 100);
        assert_eq!(cache.oldest_arrival(), Some(100));

        cache.add(orphan, [7; 32], 350);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.oldest_arrival(), Some(350));
    }

    #[test]
    fn test_distinct_gaps_order_by_arrival() {
        let mut cache = GapCache::new(quiet_config());
        cache.add(send_block([1; 32], account(0xBB), 1), [1; 32], 100);
        cache.add(send_block([2; 32], account(0xBB), 2), [2; 32], 200);

        assert_eq!(cache.len(), 2);
        // The earlier gap stays the stalest even after re-reporting the
        // later one.
        cache.add(send_block([2; 32], account(0xBB), 2), [2; 32], 300);
        assert_eq!(cache.oldest_arrival(), Some(100));
    }

    // =========================================================================
    // RECURSIVE REATTACHMENT
    // =========================================================================

    #[test]
    fn test_two_dependents_share_one_gap_record() {
        let node = node(quiet_config());
        let key = account(0xBB);
        let send1 = send_block(node.genesis_hash, key, 900);
        let send2 = send_block(send1.hash(), account(0xCC), 800);
        let open = open_block(send1.hash(), key);

        node.service.process_batch(vec![send2]);
        assert_eq!(node.service.gap_count(), 1);

        // open waits on the same missing hash; it joins the existing record.
        node.service.process_batch(vec![open]);
        assert_eq!(node.service.gap_count(), 1);
    }

    #[test]
    fn test_recursive_unblocking_across_three_calls() {
        let node = node(quiet_config());
        let key = account(0xBB);
        let send1 = send_block(node.genesis_hash, key, 900);
        let send2 = send_block(send1.hash(), account(0xCC), 800);
        let open = open_block(send1.hash(), key);

        assert!(matches!(
            node.service.process(send2.clone()),
            BlockStatus::Pending(_)
        ));
        assert!(matches!(
            node.service.process(open.clone()),
            BlockStatus::Pending(_)
        ));

        // The missing predecessor arrives in a third, separate call and
        // unblocks everything parked by the first two.
        let reports = node.service.process_batch(vec![send1.clone()]);
        assert_eq!(reports.iter().filter(|r| r.applied()).count(), 3);
        assert_eq!(node.service.gap_count(), 0);

        for block in [&send1, &send2, &open] {
            assert!(node.ledger.exists(&block.hash()));
        }
    }

    #[test]
    fn test_deep_chain_unwinds_from_a_single_root() {
        let node = node(quiet_config());
        let mut previous = node.genesis_hash;
        let mut balance = 900u64;
        let mut chain: Vec<Block> = Vec::new();
        for _ in 0..50 {
            let send = send_block(previous, account(0xBB), balance);
            previous = send.hash();
            balance -= 1;
            chain.push(send);
        }

        // Deliver everything except the root, newest first.
        let root = chain.remove(0);
        chain.reverse();
        for block in chain {
            assert!(matches!(
                node.service.process(block),
                BlockStatus::Pending(_)
            ));
        }
        assert_eq!(node.service.gap_count(), 49);

        // The root arrives last and the whole chain reattaches.
        let reports = node.service.process_batch(vec![root]);
        assert_eq!(reports.iter().filter(|r| r.applied()).count(), 50);
        assert_eq!(node.service.gap_count(), 0);
    }

    #[test]
    fn test_no_partial_application_on_gap() {
        let node = node(quiet_config());
        let genesis_account = account(0xAA);
        let before = node.ledger.account_state(&genesis_account);
        let blocks_before = node.ledger.block_count();

        let key = account(0xBB);
        let send1 = send_block(node.genesis_hash, key, 900);
        let send2 = send_block(send1.hash(), key, 800);
        node.service.process(send2);

        assert_eq!(node.ledger.account_state(&genesis_account), before);
        assert_eq!(node.ledger.block_count(), blocks_before);
    }

    // =========================================================================
    // BOOTSTRAP TRIGGERING AND FLOOD DEFENSE
    // =========================================================================

    #[test]
    fn test_persistent_gap_is_fetched_after_going_stale() {
        let config = GapConfig {
            gap_count_threshold: usize::MAX,
            stale_after_ms: 200,
            ..GapConfig::for_testing()
        };
        let node = node(config);
        let orphan = send_block([7; 32], account(0xBB), 1);
        node.service.process(orphan);
        assert!(node.bootstrap.requests().is_empty());

        node.clock.advance(250);
        node.service.sweep();
        assert_eq!(node.bootstrap.requests(), vec![[7; 32]]);
    }

    #[test]
    fn test_flood_of_distinct_gaps_is_bounded_by_capacity() {
        let config = GapConfig {
            max_records: 64,
            gap_count_threshold: usize::MAX,
            stale_after_ms: u64::MAX,
            ..GapConfig::for_testing()
        };
        let node = node(config);

        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let missing: Hash = rand::Rng::gen(&mut rng);
            node.service.process(send_block(missing, account(0xBB), 1));
            node.clock.advance(1);
        }

        assert_eq!(node.service.gap_count(), 64);
    }

    #[test]
    fn test_eviction_drops_the_stalest_gap_first() {
        let config = GapConfig {
            max_records: 2,
            gap_count_threshold: usize::MAX,
            stale_after_ms: u64::MAX,
            ..GapConfig::for_testing()
        };
        let node = node(config);

        for (index, byte) in [1u8, 2, 3].into_iter().enumerate() {
            node.clock.set(100 * (index as u64 + 1));
            node.service
                .process(send_block([byte; 32], account(0xBB), 1));
        }

        assert_eq!(node.service.gap_count(), 2);
        assert!(!node.service.gap_contains(&[1; 32]));
        assert!(node.service.gap_contains(&[2; 32]));
        assert!(node.service.gap_contains(&[3; 32]));
    }
}
