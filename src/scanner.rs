use {
    crate::client::LedgerClient,
    crate::extractor::{extract_balance_changes, BalanceDelta},
    num_bigint::BigUint,
    num_traits::ToPrimitive,
    std::{ops::RangeInclusive, sync::Arc},
    tokio::sync::{mpsc, Mutex},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The chain head does not fit the native block-number type. This is an
    /// environment problem, not a per-block one, and aborts the whole run.
    HeadOverflow(BigUint),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::HeadOverflow(head) => {
                write!(f, "Chain head {} does not fit in a u64 block number", head)
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// Frame the trailing window `[head - window, head]` as block numbers.
///
/// Fails before any job exists if the head is not representable. The range
/// saturates at genesis, and the same inputs always produce the same range.
pub fn frame_window(head: &BigUint, window: u64) -> Result<RangeInclusive<u64>, ScanError> {
    let head = head
        .to_u64()
        .ok_or_else(|| ScanError::HeadOverflow(head.clone()))?;
    Ok(head.saturating_sub(window)..=head)
}

/// Fetch every block in the window through a bounded worker pool and return
/// the closed, fully-buffered results channel.
///
/// One job per block number is queued up front; the job channel is sized to
/// the job count so filling it never blocks, and dropping the sender closes
/// the queue. `pool_size` workers share the queue and answer every job with
/// exactly one batch of deltas (empty when the fetch fails). The function
/// joins every worker before returning, so by the time the receiver is
/// handed to the caller no batch can still be in flight.
pub async fn scan_window(
    client: Arc<dyn LedgerClient>,
    blocks: RangeInclusive<u64>,
    pool_size: usize,
) -> mpsc::Receiver<Vec<BalanceDelta>> {
    let job_count = (blocks.end() - blocks.start() + 1) as usize;

    let (job_tx, job_rx) = mpsc::channel::<u64>(job_count);
    let (batch_tx, batch_rx) = mpsc::channel::<Vec<BalanceDelta>>(job_count);

    for number in blocks {
        // Capacity equals the job count, so this never blocks.
        if job_tx.send(number).await.is_err() {
            break;
        }
    }
    drop(job_tx);

    let job_rx = Arc::new(Mutex::new(job_rx));

    let mut handles = Vec::with_capacity(pool_size);
    for worker_id in 0..pool_size {
        let client = client.clone();
        let jobs = job_rx.clone();
        let batches = batch_tx.clone();
        handles.push(tokio::spawn(async move {
            worker_loop(worker_id, client, jobs, batches).await;
        }));
    }
    drop(batch_tx);

    // Completion barrier: the results channel only closes once every worker
    // has exited and dropped its sender.
    for handle in handles {
        if let Err(e) = handle.await {
            log::error!("❌ Worker task panicked: {}", e);
        }
    }

    batch_rx
}

/// One worker: pull jobs until the queue is closed and drained, one batch
/// out per job in. A failed fetch is logged and answered with an empty
/// batch; it never takes down the pool.
async fn worker_loop(
    worker_id: usize,
    client: Arc<dyn LedgerClient>,
    jobs: Arc<Mutex<mpsc::Receiver<u64>>>,
    batches: mpsc::Sender<Vec<BalanceDelta>>,
) {
    loop {
        let number = {
            let mut jobs = jobs.lock().await;
            match jobs.recv().await {
                Some(number) => number,
                None => break,
            }
        };

        let batch = match client.block_with_transactions(number).await {
            Ok(block) => {
                let deltas = extract_balance_changes(&block);
                log::debug!(
                    "Block {}: {} transactions, {} deltas",
                    number,
                    block.transactions.len(),
                    deltas.len()
                );
                deltas
            }
            Err(e) => {
                // Intentional silent-data-loss policy: the failed block
                // contributes nothing, the rest of the window still counts.
                log::warn!("⚠️ Failed to fetch block {}: {}", number, e);
                Vec::new()
            }
        };

        // Capacity equals the job count, so this never blocks.
        if batches.send(batch).await.is_err() {
            break;
        }
    }

    log::debug!("Worker {} finished", worker_id);
}
