//! Platform fee policy.
//!
//! Every purchase is split into a fixed 5% platform fee and the creator's
//! share. Arithmetic is exact decimal; the two parts always sum back to the
//! purchase amount.
//!
//! Ledger amounts are stored as `NUMERIC(36, 18)`. An amount must fit that
//! column and so must its fee, which carries two more decimal places than
//! the amount. [`ensure_ledger_amount`] enforces both limits.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::MarketError;

/// Platform cut of every purchase (0.05 = 5%).
pub const PLATFORM_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Most decimal places a ledger amount may carry.
pub const MAX_AMOUNT_SCALE: u32 = 16;

/// Exclusive upper bound of a ledger amount (10^18).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(2_808_348_672, 232_830_643, 0, false, 0);

/// Result of applying [`PLATFORM_FEE_RATE`] to a purchase amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeSplit {
    /// Gross amount paid by the buyer.
    pub amount: Decimal,
    /// Share retained by the platform.
    pub platform_fee: Decimal,
    /// Share owed to the creator.
    pub creator_earnings: Decimal,
}

impl FeeSplit {
    /// Splits `amount` into platform fee and creator earnings.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRequest`] if `amount` is not positive or
    /// falls outside the range accepted by [`ensure_ledger_amount`].
    pub fn compute(amount: Decimal) -> Result<Self, MarketError> {
        if amount <= Decimal::ZERO {
            return Err(MarketError::InvalidRequest(
                "amount must be positive".to_string(),
            ));
        }
        let amount = ensure_ledger_amount(amount, "amount")?;
        let platform_fee = amount
            .checked_mul(PLATFORM_FEE_RATE)
            .ok_or_else(|| MarketError::InvalidRequest("amount out of range".to_string()))?
            .normalize();
        let creator_earnings = amount
            .checked_sub(platform_fee)
            .ok_or_else(|| MarketError::InvalidRequest("amount out of range".to_string()))?
            .normalize();

        Ok(Self {
            amount,
            platform_fee,
            creator_earnings,
        })
    }
}

/// Parses a strictly positive decimal amount from its textual form.
///
/// Accepts plain (`"0.05"`) and scientific (`"5e-2"`) notation. Returns
/// `None` for anything else, including zero and negative values.
#[must_use]
pub fn parse_positive_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .filter(|amount| *amount > Decimal::ZERO)
}

/// Normalizes `amount` and checks that it fits a ledger column.
///
/// `field` names the value in the error message.
///
/// # Errors
///
/// Returns [`MarketError::InvalidRequest`] if `amount` has more than
/// [`MAX_AMOUNT_SCALE`] decimal places or is not below [`AMOUNT_LIMIT`].
pub fn ensure_ledger_amount(amount: Decimal, field: &str) -> Result<Decimal, MarketError> {
    let amount = amount.normalize();
    if amount.scale() > MAX_AMOUNT_SCALE {
        return Err(MarketError::InvalidRequest(format!(
            "{field} has more than {MAX_AMOUNT_SCALE} decimal places"
        )));
    }
    if amount.abs() >= AMOUNT_LIMIT {
        return Err(MarketError::InvalidRequest(format!("{field} must be below 1e18")));
    }
    Ok(amount)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        let Ok(d) = Decimal::from_str(s) else {
            panic!("bad decimal literal {s}");
        };
        d
    }

    #[test]
    fn one_unit_splits_into_five_percent() {
        let Ok(split) = FeeSplit::compute(dec("1.0")) else {
            panic!("split failed");
        };
        assert_eq!(split.platform_fee, dec("0.05"));
        assert_eq!(split.creator_earnings, dec("0.95"));
        assert_eq!(split.platform_fee.to_string(), "0.05");
        assert_eq!(split.creator_earnings.to_string(), "0.95");
    }

    #[test]
    fn parts_always_sum_to_amount() {
        for raw in [
            "0.1",
            "0.3",
            "0.0000000000000001",
            "1",
            "12.345678",
            "99999.99",
            "0.07",
            "123456789.123456789",
            "0.3000000000000003",
            "999999999999999999.99",
        ] {
            let amount = dec(raw);
            let Ok(split) = FeeSplit::compute(amount) else {
                panic!("split failed for {raw}");
            };
            assert_eq!(split.platform_fee + split.creator_earnings, amount, "{raw}");
            assert_eq!(split.platform_fee, amount * PLATFORM_FEE_RATE, "{raw}");
        }
    }

    #[test]
    fn no_binary_float_drift() {
        // 0.1 * 0.05 is 0.005000000000000001 in f64.
        let Ok(split) = FeeSplit::compute(dec("0.1")) else {
            panic!("split failed");
        };
        assert_eq!(split.platform_fee.to_string(), "0.005");
        assert_eq!(split.creator_earnings.to_string(), "0.095");
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(FeeSplit::compute(Decimal::ZERO).is_err());
        assert!(FeeSplit::compute(dec("-1")).is_err());
    }

    #[test]
    fn parses_positive_amounts_only() {
        assert_eq!(parse_positive_amount("1.0"), Some(dec("1.0")));
        assert_eq!(parse_positive_amount(" 0.05 "), Some(dec("0.05")));
        assert_eq!(parse_positive_amount("5e-2"), Some(dec("0.05")));
        assert_eq!(parse_positive_amount("0"), None);
        assert_eq!(parse_positive_amount("-1"), None);
        assert_eq!(parse_positive_amount("one"), None);
        assert_eq!(parse_positive_amount(""), None);
    }

    #[test]
    fn limit_is_ten_to_the_eighteenth() {
        assert_eq!(AMOUNT_LIMIT, dec("1000000000000000000"));
    }

    #[test]
    fn fee_of_a_ledger_amount_fits_eighteen_places() {
        let Ok(split) = FeeSplit::compute(dec("0.3000000000000003")) else {
            panic!("split failed");
        };
        assert!(split.platform_fee.scale() <= 18);
        assert!(split.creator_earnings.scale() <= 18);
        assert_eq!(split.platform_fee, dec("0.015000000000000015"));
    }

    #[test]
    fn rejects_amounts_with_too_many_decimals() {
        for raw in ["0.30000000000000003", "0.000000000000000001", "1.00000000000000001"] {
            assert!(
                matches!(
                    FeeSplit::compute(dec(raw)),
                    Err(MarketError::InvalidRequest(_))
                ),
                "{raw}"
            );
        }
    }

    #[test]
    fn trailing_zeros_do_not_count_as_decimals() {
        let Ok(amount) = ensure_ledger_amount(dec("2.500000000000000000000"), "amount") else {
            panic!("amount rejected");
        };
        assert_eq!(amount.to_string(), "2.5");
    }

    #[test]
    fn rejects_amounts_at_or_above_the_limit() {
        for raw in ["1000000000000000000", "1000000000000000000.5", "12345678901234567890"] {
            assert!(
                matches!(
                    FeeSplit::compute(dec(raw)),
                    Err(MarketError::InvalidRequest(_))
                ),
                "{raw}"
            );
        }
        assert!(FeeSplit::compute(dec("999999999999999999")).is_ok());
    }
}
