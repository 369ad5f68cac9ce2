//! End-to-end tests for the fetch/aggregate pipeline.
//!
//! The pipeline is driven through a mock LedgerClient so tests exercise the
//! real worker pool, completion barrier, aggregation, and ranking without a
//! network.

use {
    async_trait::async_trait,
    ethflow::{
        aggregator::{self, BalanceBook},
        client::{Block, ClientError, LedgerClient, Transaction},
        ranker, scanner,
    },
    num_bigint::BigUint,
    std::{
        collections::{HashMap, HashSet},
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    },
};

/// In-memory ledger: fixed head, canned blocks, an optional set of block
/// numbers whose fetches fail, and a counter of fetch attempts.
struct MockLedger {
    head: BigUint,
    blocks: HashMap<u64, Block>,
    failing: HashSet<u64>,
    fetch_calls: AtomicUsize,
}

impl MockLedger {
    fn new(head: u64) -> Self {
        Self {
            head: BigUint::from(head),
            blocks: HashMap::new(),
            failing: HashSet::new(),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    fn with_block(mut self, number: u64, transactions: Vec<Transaction>) -> Self {
        self.blocks.insert(number, Block { transactions });
        self
    }

    fn with_failing(mut self, number: u64) -> Self {
        self.failing.insert(number);
        self
    }

    fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn latest_block_number(&self) -> Result<BigUint, ClientError> {
        Ok(self.head.clone())
    }

    async fn block_with_transactions(&self, number: u64) -> Result<Block, ClientError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&number) {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        Ok(self.blocks.get(&number).cloned().unwrap_or_default())
    }
}

fn transfer(from: &str, to: &str, value: u64) -> Transaction {
    Transaction {
        from: from.to_string(),
        to: Some(to.to_string()),
        value: BigUint::from(value),
    }
}

async fn scan_and_aggregate(ledger: Arc<MockLedger>, window: u64, pool_size: usize) -> BalanceBook {
    let head = ledger.latest_block_number().await.unwrap();
    let blocks = scanner::frame_window(&head, window).unwrap();
    let batches = scanner::scan_window(ledger, blocks, pool_size).await;
    aggregator::drain_batches(batches).await
}

/// Three consecutive blocks, one X→Y transfer of 10 each: both endpoints
/// end at 30 and both appear in the ranking, tied, in address order.
#[tokio::test]
async fn test_end_to_end_three_blocks() {
    let ledger = Arc::new(
        MockLedger::new(2)
            .with_block(0, vec![transfer("X", "Y", 10)])
            .with_block(1, vec![transfer("X", "Y", 10)])
            .with_block(2, vec![transfer("X", "Y", 10)]),
    );

    let book = scan_and_aggregate(ledger.clone(), 2, 2).await;

    assert_eq!(book.len(), 2);
    assert_eq!(book.balance("X"), Some(&BigUint::from(30u32)));
    assert_eq!(book.balance("Y"), Some(&BigUint::from(30u32)));
    assert_eq!(ledger.fetch_calls(), 3);

    let ranked = ranker::rank_addresses(&book);
    assert_eq!(ranked, vec!["X", "Y"]);
}

/// A failed block contributes nothing, the rest of the window still counts,
/// and every job in the window is still attempted exactly once.
#[tokio::test]
async fn test_partial_failure_isolation() {
    let window = 4u64; // blocks 6..=10
    let ledger = Arc::new(
        MockLedger::new(10)
            .with_block(6, vec![transfer("A", "B", 1)])
            .with_block(7, vec![transfer("A", "B", 1)])
            .with_block(8, vec![transfer("A", "B", 100)])
            .with_failing(8)
            .with_block(9, vec![transfer("A", "B", 1)])
            .with_block(10, vec![transfer("A", "B", 1)]),
    );

    let book = scan_and_aggregate(ledger.clone(), window, 3).await;

    // Block 8's transfer of 100 is absent from both totals.
    assert_eq!(book.balance("A"), Some(&BigUint::from(4u32)));
    assert_eq!(book.balance("B"), Some(&BigUint::from(4u32)));
    // All five jobs were dispatched despite the failure.
    assert_eq!(ledger.fetch_calls(), window as usize + 1);
}

/// A non-representable chain head fails the run before any fetch happens.
#[tokio::test]
async fn test_overflowing_head_fails_before_any_fetch() {
    let ledger = Arc::new(MockLedger::new(0));
    let head = BigUint::from(u64::MAX) + 1u32;

    let err = scanner::frame_window(&head, 100).unwrap_err();
    assert_eq!(err, scanner::ScanError::HeadOverflow(head));
    assert_eq!(ledger.fetch_calls(), 0);
}

/// The aggregate is independent of worker count and scheduling: one worker
/// and many workers over the same window produce the same book.
#[tokio::test]
async fn test_aggregate_independent_of_pool_size() {
    fn build_ledger() -> Arc<MockLedger> {
        let mut ledger = MockLedger::new(9);
        for number in 0..=9u64 {
            ledger.blocks.insert(
                number,
                Block {
                    transactions: vec![
                        transfer("A", "B", number + 1),
                        transfer("C", "A", 2 * (number + 1)),
                    ],
                },
            );
        }
        Arc::new(ledger)
    }

    let serial = scan_and_aggregate(build_ledger(), 9, 1).await;
    let parallel = scan_and_aggregate(build_ledger(), 9, 8).await;

    for address in ["A", "B", "C"] {
        assert_eq!(serial.balance(address), parallel.balance(address));
    }
    // 1+2+..+10 = 55 from sending, 2*55 = 110 from receiving.
    assert_eq!(serial.balance("A"), Some(&BigUint::from(165u32)));
    assert_eq!(serial.balance("B"), Some(&BigUint::from(55u32)));
    assert_eq!(serial.balance("C"), Some(&BigUint::from(110u32)));
}

/// More workers than jobs: idle workers exit cleanly and the barrier still
/// releases.
#[tokio::test]
async fn test_more_workers_than_jobs() {
    let ledger = Arc::new(MockLedger::new(1).with_block(1, vec![transfer("A", "B", 5)]));

    let book = scan_and_aggregate(ledger.clone(), 1, 16).await;

    assert_eq!(ledger.fetch_calls(), 2);
    assert_eq!(book.balance("A"), Some(&BigUint::from(5u32)));
}

/// Ranking: {A: 50, B: 100, C: 100} puts A strictly last; the B/C tie is
/// broken deterministically by address.
#[tokio::test]
async fn test_ranking_order_with_ties() {
    let ledger = Arc::new(MockLedger::new(0).with_block(
        0,
        vec![
            // Every endpoint below appears exactly once per transfer.
            Transaction {
                from: "A".to_string(),
                to: None,
                value: BigUint::from(50u32),
            },
            Transaction {
                from: "B".to_string(),
                to: None,
                value: BigUint::from(100u32),
            },
            Transaction {
                from: "C".to_string(),
                to: None,
                value: BigUint::from(100u32),
            },
        ],
    ));

    let book = scan_and_aggregate(ledger, 0, 1).await;
    let ranked = ranker::rank_addresses(&book);
    assert_eq!(ranked, vec!["B", "C", "A"]);
}
