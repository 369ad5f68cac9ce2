use {num_bigint::BigUint, num_traits::Zero};

/// ETH carries 18 decimals.
const WEI_DECIMALS: usize = 18;

/// Convert a wei amount to an exact ETH decimal string.
///
/// No floating point: the amount is split by integer div/rem so values far
/// beyond 64 bits render exactly. Trailing fraction zeros are trimmed.
pub fn wei_to_eth(amount: &BigUint) -> String {
    let scale = BigUint::from(10u32).pow(WEI_DECIMALS as u32);
    let whole = amount / &scale;
    let frac = amount % &scale;

    if frac.is_zero() {
        return whole.to_string();
    }

    let mut frac = frac.to_string();
    while frac.len() < WEI_DECIMALS {
        frac.insert(0, '0');
    }
    let frac = frac.trim_end_matches('0');

    format!("{}.{}", whole, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(raw: &str) -> BigUint {
        BigUint::parse_bytes(raw.as_bytes(), 10).unwrap()
    }

    #[test]
    fn test_whole_eth() {
        assert_eq!(wei_to_eth(&wei("1000000000000000000")), "1");
        assert_eq!(wei_to_eth(&wei("25000000000000000000")), "25");
    }

    #[test]
    fn test_fractional_eth() {
        assert_eq!(wei_to_eth(&wei("1500000000000000000")), "1.5");
        assert_eq!(wei_to_eth(&wei("1")), "0.000000000000000001");
    }

    #[test]
    fn test_zero() {
        assert_eq!(wei_to_eth(&BigUint::zero()), "0");
    }

    #[test]
    fn test_beyond_u64() {
        // 2^64 wei is ~18.45 ETH; sums over a window can go much higher.
        assert_eq!(
            wei_to_eth(&wei("123456789000000000000000000")),
            "123456789"
        );
    }
}
