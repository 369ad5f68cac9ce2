use {
    crate::extractor::BalanceDelta,
    num_bigint::BigUint,
    std::collections::HashMap,
    tokio::sync::mpsc,
};

/// Cumulative per-address balance changes for one scanned window.
///
/// The book is exclusively owned by whoever drains the results channel;
/// workers never see it. That confinement, not locking, is what makes the
/// pipeline race-free: every worker produces isolated immutable batches and
/// a single task folds them in.
#[derive(Debug, Default)]
pub struct BalanceBook {
    balances: HashMap<String, BigUint>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Add one delta into the address's running total (zero if absent).
    pub fn apply(&mut self, delta: BalanceDelta) {
        let total = self.balances.entry(delta.address).or_default();
        *total += delta.amount;
    }

    pub fn merge_batch(&mut self, batch: Vec<BalanceDelta>) {
        for delta in batch {
            self.apply(delta);
        }
    }

    pub fn balance(&self, address: &str) -> Option<&BigUint> {
        self.balances.get(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BigUint)> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Drain every batch from the closed results channel into one book.
///
/// Must only be handed a receiver whose senders are all gone (scan_window
/// guarantees this); reading an open channel here could miss in-flight
/// batches.
pub async fn drain_batches(mut batches: mpsc::Receiver<Vec<BalanceDelta>>) -> BalanceBook {
    let mut book = BalanceBook::new();
    let mut batch_count = 0usize;

    while let Some(batch) = batches.recv().await {
        batch_count += 1;
        book.merge_batch(batch);
    }

    log::info!(
        "📊 Aggregated {} batches into {} addresses",
        batch_count,
        book.len()
    );
    book
}
