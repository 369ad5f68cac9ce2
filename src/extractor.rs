use {
    crate::client::Block,
    num_bigint::BigUint,
    num_traits::Zero,
};

/// One address's contribution from a single transaction.
///
/// Deltas for the same address combine by addition; combination is
/// commutative and associative, so batches can be merged in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDelta {
    pub address: String,
    pub amount: BigUint,
}

/// Extract per-address value movements from one block.
///
/// Both endpoints of a transfer are credited with the full value, so the
/// aggregate measures gross value touched per address rather than signed
/// net flow. A net-flow view would debit the sender instead.
pub fn extract_balance_changes(block: &Block) -> Vec<BalanceDelta> {
    let mut deltas = Vec::new();

    for tx in &block.transactions {
        // Zero-value transactions are almost always contract calls or token
        // transfers; any value they move lives inside contract state and is
        // not visible at this level, so they are skipped.
        if tx.value.is_zero() {
            continue;
        }

        deltas.push(BalanceDelta {
            address: tx.from.clone(),
            amount: tx.value.clone(),
        });

        // Contract creations carry no recipient.
        if let Some(to) = &tx.to {
            deltas.push(BalanceDelta {
                address: to.clone(),
                amount: tx.value.clone(),
            });
        }
    }

    deltas
}
