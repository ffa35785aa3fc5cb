// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Currency arithmetic helpers.
//!
//! Amounts are `rust_decimal::Decimal` end to end. Intermediate results keep
//! full precision; values are rounded to the minor unit only when they are
//! stored, compared for settlement, or shown.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{EngineError, Result};

/// Minor-unit precision of every stored or displayed amount.
pub const MONEY_DP: u32 = 2;

/// Round to the currency minor unit, half away from zero. The result always
/// carries exactly `MONEY_DP` fractional digits (`960` becomes `960.00`).
pub fn round_money(d: Decimal) -> Decimal {
    let mut r = d.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    r.rescale(MONEY_DP);
    r
}

/// True when `d` is already expressible in whole minor units.
pub fn is_minor_unit_exact(d: Decimal) -> bool {
    d.normalize().scale() <= MONEY_DP
}

/// Outstanding balance of an invoice: `total - paid`, rounded, never negative.
///
/// Residue smaller than half a minor unit rounds to zero, so a booking can not
/// flip between settled and outstanding on sub-cent noise.
pub fn outstanding(total: Decimal, paid: Decimal) -> Decimal {
    round_money(total - paid).max(Decimal::ZERO)
}

pub fn is_outstanding(total: Decimal, paid: Decimal) -> bool {
    outstanding(total, paid) > Decimal::ZERO
}

/// Validate a payment amount and check it fits in the remaining balance.
///
/// Shared by the ledger and the storage layer so both apply the same rule.
pub fn check_payment(total: Decimal, paid: Decimal, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO || !is_minor_unit_exact(amount) {
        return Err(EngineError::InvalidAmount(amount));
    }
    let remaining = outstanding(total, paid);
    if amount > remaining {
        return Err(EngineError::OverpaymentRejected {
            outstanding: remaining,
            requested: amount,
        });
    }
    Ok(())
}

pub fn sum<'a, I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = &'a Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, d| acc + *d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(d("405.70375")), d("405.70"));
        assert_eq!(round_money(d("0.125")), d("0.13"));
        assert_eq!(round_money(d("-0.125")), d("-0.13"));
    }

    #[test]
    fn sub_cent_residue_is_settled() {
        assert!(!is_outstanding(d("1000"), d("999.9999999999")));
        assert_eq!(outstanding(d("1000"), d("999.9999999999")), Decimal::ZERO);
        assert!(is_outstanding(d("1000"), d("999.99")));
    }

    #[test]
    fn overpaid_balance_clamps_to_zero() {
        assert_eq!(outstanding(d("100"), d("150")), Decimal::ZERO);
    }

    #[test]
    fn rejects_sub_cent_and_non_positive_amounts() {
        assert!(matches!(
            check_payment(d("100"), Decimal::ZERO, d("0")),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            check_payment(d("100"), Decimal::ZERO, d("-5")),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            check_payment(d("100"), Decimal::ZERO, d("1.005")),
            Err(EngineError::InvalidAmount(_))
        ));
        // trailing zeros are not extra precision
        assert!(check_payment(d("100"), Decimal::ZERO, d("1.5000")).is_ok());
    }

    #[test]
    fn exact_remaining_balance_is_accepted() {
        assert!(check_payment(d("1000"), d("600"), d("400")).is_ok());
        assert!(matches!(
            check_payment(d("1000"), d("600"), d("400.01")),
            Err(EngineError::OverpaymentRejected { .. })
        ));
    }
}
