//! Wei/ETH conversion with exact decimal arithmetic.

use rust_decimal::Decimal;

/// Fee amounts are 18-decimal fixed-point integers.
pub const WEI_DECIMALS: u32 = 18;

/// Convert a wei amount to ETH without any binary floating point.
///
/// Returns `None` when the amount does not fit the decimal range
/// (about 7.9e28 wei).
///
/// # Examples
/// ```
/// use dvn_analyzer::utils::units::wei_to_eth;
///
/// assert_eq!(wei_to_eth(1_500_000_000_000_000_000).unwrap().to_string(), "1.5");
/// ```
pub fn wei_to_eth(wei: i128) -> Option<Decimal> {
    Decimal::try_from_i128_with_scale(wei, WEI_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

/// Render an ETH amount as a plain decimal string (`"1"`, `"0.000000000000000001"`).
pub fn format_eth(eth: &Decimal) -> String {
    eth.normalize().to_string()
}

/// Mean of exact amounts, rounded to wei precision.
pub fn decimal_mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let total: Decimal = values.iter().copied().sum();
    let mean = total.checked_div(Decimal::from(values.len()))?;
    Some(mean.round_dp(WEI_DECIMALS).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_whole_and_fractional_eth() {
        assert_eq!(format_eth(&wei_to_eth(1_000_000_000_000_000_000).unwrap()), "1");
        assert_eq!(format_eth(&wei_to_eth(1_500_000_000_000_000_000).unwrap()), "1.5");
        assert_eq!(format_eth(&wei_to_eth(1).unwrap()), "0.000000000000000001");
        assert_eq!(format_eth(&wei_to_eth(0).unwrap()), "0");
    }

    #[test]
    fn test_no_binary_float_artifacts() {
        let eth = wei_to_eth(1_499_999_999_999_999_999).unwrap();
        assert_eq!(format_eth(&eth), "1.499999999999999999");
    }

    #[test]
    fn test_out_of_range_is_none() {
        assert!(wei_to_eth(i128::MAX).is_none());
    }

    #[test]
    fn test_decimal_mean() {
        let values = vec![
            Decimal::from_str("0.1").unwrap(),
            Decimal::from_str("0.2").unwrap(),
        ];
        assert_eq!(decimal_mean(&values).unwrap().to_string(), "0.15");
        assert!(decimal_mean(&[]).is_none());
    }
}
