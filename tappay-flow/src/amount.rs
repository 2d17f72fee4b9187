//! Decimal amount parsing and smallest-unit conversion
//!
//! Amounts are parsed as exact decimal strings. Digits past the
//! currency's precision are truncated, so `0.0000000000000000019` at 18
//! decimals becomes `1`.

use crate::network::NATIVE_DECIMALS;
use crate::ValidationError;

/// Convert an operator-entered amount to the smallest unit of an
/// 18-decimal currency.
pub fn to_smallest_unit(amount: &str) -> Result<u128, ValidationError> {
    parse_amount(amount, NATIVE_DECIMALS)
}

/// Parse a positive decimal amount into units of `10^-decimals`.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<u128, ValidationError> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err(ValidationError::MissingAmount);
    }

    let (whole_part, frac_part) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    if whole_part.is_empty() && frac_part.is_empty() {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    if !whole_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    // Also rejects a second decimal point
    if !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }

    let scale = 10u128
        .checked_pow(u32::from(decimals))
        .ok_or(ValidationError::AmountOverflow)?;

    let whole_units = if whole_part.is_empty() {
        0
    } else {
        whole_part
            .parse::<u128>()
            .map_err(|_| ValidationError::AmountOverflow)?
            .checked_mul(scale)
            .ok_or(ValidationError::AmountOverflow)?
    };

    // Truncate, then right-pad to `decimals` digits
    let decimals = usize::from(decimals);
    let kept = &frac_part[..frac_part.len().min(decimals)];
    let frac_units = if kept.is_empty() {
        0
    } else {
        format!("{:0<width$}", kept, width = decimals)
            .parse::<u128>()
            .map_err(|_| ValidationError::InvalidAmount(amount.to_string()))?
    };

    let total = whole_units
        .checked_add(frac_units)
        .ok_or(ValidationError::AmountOverflow)?;

    if total == 0 {
        return Err(ValidationError::NonPositiveAmount);
    }

    Ok(total)
}

/// Format smallest units as a decimal string without trailing zeros.
pub fn format_amount(units: u128, decimals: u8) -> String {
    let scale = 10u128.pow(u32::from(decimals));
    let whole = units / scale;
    let frac = units % scale;

    if frac == 0 {
        format!("{}", whole)
    } else {
        let frac_str = format!("{:0width$}", frac, width = usize::from(decimals));
        format!("{}.{}", whole, frac_str.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEI: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_amount_parsing() {
        assert_eq!(to_smallest_unit("1").unwrap(), WEI);
        assert_eq!(to_smallest_unit("1.0").unwrap(), WEI);
        assert_eq!(to_smallest_unit("0.01").unwrap(), 10_000_000_000_000_000);
        assert_eq!(to_smallest_unit(".5").unwrap(), WEI / 2);
        assert_eq!(to_smallest_unit("2.").unwrap(), 2 * WEI);
        assert_eq!(to_smallest_unit(" 0.000000000000000001 ").unwrap(), 1);
    }

    #[test]
    fn test_excess_precision_is_floored() {
        assert_eq!(to_smallest_unit("0.0000000000000000019").unwrap(), 1);
        assert_eq!(to_smallest_unit("1.9999999999999999999").unwrap(), 2 * WEI - 1);
        assert_eq!(
            to_smallest_unit("0.0000000000000000009"),
            Err(ValidationError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_rejected_amounts() {
        assert_eq!(to_smallest_unit(""), Err(ValidationError::MissingAmount));
        assert_eq!(to_smallest_unit("   "), Err(ValidationError::MissingAmount));
        assert_eq!(to_smallest_unit("0"), Err(ValidationError::NonPositiveAmount));
        assert_eq!(to_smallest_unit("0.000"), Err(ValidationError::NonPositiveAmount));

        for bad in [".", "-1", "+1", "1e3", "1.2.3", "abc", "1,5", "0x10"] {
            assert!(
                matches!(to_smallest_unit(bad), Err(ValidationError::InvalidAmount(_))),
                "{bad} should be invalid"
            );
        }
    }

    #[test]
    fn test_overflow() {
        // u128::MAX is about 3.4e38, i.e. 3.4e20 whole units at 18 decimals
        assert_eq!(
            to_smallest_unit("340282366920938463464"),
            Err(ValidationError::AmountOverflow)
        );
        assert!(to_smallest_unit("340282366920938463463").is_ok());
        assert_eq!(
            to_smallest_unit(&"9".repeat(60)),
            Err(ValidationError::AmountOverflow)
        );
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_amount(WEI, 18), "1");
        assert_eq!(format_amount(10_000_000_000_000_000, 18), "0.01");
        assert_eq!(format_amount(1, 18), "0.000000000000000001");
        assert_eq!(format_amount(123_450_000, 8), "1.2345");
    }
}
