use {
    crate::aggregator::BalanceBook,
    crate::units::wei_to_eth,
    num_bigint::BigUint,
};

const RANK_HEADER: &str = "#";
const ADDRESS_HEADER: &str = "Address";
const AMOUNT_HEADER: &str = "Total Change (ETH)";

/// Print the ranked results as a table on stdout.
///
/// Logs go to stderr, so this table is the process's only stdout output.
pub fn render_table(addresses: &[String], book: &BalanceBook) {
    let zero = BigUint::default();
    let rows: Vec<(String, String, String)> = addresses
        .iter()
        .enumerate()
        .map(|(i, address)| {
            let amount = book.balance(address).unwrap_or(&zero);
            (
                (i + 1).to_string(),
                address.clone(),
                wei_to_eth(amount),
            )
        })
        .collect();

    let rank_width = column_width(RANK_HEADER, rows.iter().map(|r| r.0.len()));
    let address_width = column_width(ADDRESS_HEADER, rows.iter().map(|r| r.1.len()));
    let amount_width = column_width(AMOUNT_HEADER, rows.iter().map(|r| r.2.len()));

    println!(
        "{:>rank_width$} | {:<address_width$} | {:>amount_width$}",
        RANK_HEADER, ADDRESS_HEADER, AMOUNT_HEADER
    );
    println!(
        "{}-+-{}-+-{}",
        "-".repeat(rank_width),
        "-".repeat(address_width),
        "-".repeat(amount_width)
    );

    for (rank, address, amount) in &rows {
        println!(
            "{:>rank_width$} | {:<address_width$} | {:>amount_width$}",
            rank, address, amount
        );
    }
}

fn column_width(header: &str, cells: impl Iterator<Item = usize>) -> usize {
    cells.fold(header.len(), usize::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_width_covers_header_and_cells() {
        assert_eq!(column_width("#", [1, 3, 2].into_iter()), 3);
        assert_eq!(column_width("Address", std::iter::empty()), 7);
    }
}
