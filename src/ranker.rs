use crate::aggregator::BalanceBook;

/// Order addresses by descending cumulative change.
///
/// Ties break by ascending address, so repeated runs over the same window
/// always print the same table.
pub fn rank_addresses(book: &BalanceBook) -> Vec<String> {
    let mut addresses: Vec<String> = book.iter().map(|(address, _)| address.clone()).collect();

    addresses.sort_by(|a, b| {
        let balance_a = book.balance(a);
        let balance_b = book.balance(b);
        balance_b.cmp(&balance_a).then_with(|| a.cmp(b))
    });

    addresses
}
