// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Turns a rate card and a stay into nights and money.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::{EngineError, Result};
use crate::models::{Quote, RateCard};
use crate::money::round_money;

/// Whole nights between check-in and check-out. Check-out must be strictly later.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> Result<u32> {
    let days = (check_out - check_in).num_days();
    if days <= 0 {
        return Err(EngineError::InvalidDateRange {
            check_in,
            check_out,
        });
    }
    u32::try_from(days).map_err(|_| EngineError::InvalidDateRange {
        check_in,
        check_out,
    })
}

fn out_of_range(rate_card: &RateCard) -> EngineError {
    EngineError::InvalidRateCard(format!(
        "hotel {} prices {} at {}% markup beyond the representable range",
        rate_card.id, rate_card.base_price, rate_card.markup_percentage
    ))
}

/// `base * (1 + markup/100)`, unrounded.
pub fn selling_price_per_night(rate_card: &RateCard) -> Result<Decimal> {
    rate_card
        .markup_percentage
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|m| Decimal::ONE.checked_add(m))
        .and_then(|factor| rate_card.base_price.checked_mul(factor))
        .ok_or_else(|| out_of_range(rate_card))
}

pub fn price(
    rate_card: &RateCard,
    check_in: NaiveDate,
    check_out: NaiveDate,
    room_count: u32,
) -> Result<Quote> {
    let nights = nights(check_in, check_out)?;
    if room_count == 0 {
        return Err(EngineError::InvalidRoomCount(0));
    }
    // u32 * u32 always fits a Decimal
    let units = Decimal::from(u64::from(nights) * u64::from(room_count));
    let base = rate_card.base_price;
    let selling = selling_price_per_night(rate_card)?;
    let too_many_rooms = || EngineError::InvalidRoomCount(i64::from(room_count));
    let total_base = base.checked_mul(units).ok_or_else(too_many_rooms)?;
    let total_selling = selling.checked_mul(units).ok_or_else(too_many_rooms)?;

    Ok(Quote {
        nights,
        base_price_per_night: round_money(base),
        selling_price_per_night: round_money(selling),
        total_base_cost: round_money(total_base),
        total_selling_price: round_money(total_selling),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealPackage, RoomType};
    use std::str::FromStr;

    fn card(base: &str, markup: &str) -> RateCard {
        RateCard {
            id: 1,
            name: "Hilton Makkah".into(),
            location: "Makkah".into(),
            room_type: RoomType::Double,
            meal_package: MealPackage::Fullboard,
            base_price: Decimal::from_str(base).unwrap(),
            markup_percentage: Decimal::from_str(markup).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn two_nights_two_rooms() {
        let q = price(&card("200", "20"), date("2024-01-01"), date("2024-01-03"), 2).unwrap();
        assert_eq!(q.nights, 2);
        assert_eq!(q.base_price_per_night, d("200"));
        assert_eq!(q.selling_price_per_night, d("240"));
        assert_eq!(q.total_base_cost, d("800"));
        assert_eq!(q.total_selling_price, d("960"));
        assert_eq!(q.total_selling_price.to_string(), "960.00");
    }

    #[test]
    fn single_night_single_room() {
        let q = price(&card("200", "20"), date("2024-01-01"), date("2024-01-02"), 1).unwrap();
        assert_eq!(q.nights, 1);
        assert_eq!(q.total_selling_price, d("240"));
    }

    #[test]
    fn totals_round_once_from_full_precision() {
        // 350.50 * 1.1575 = 405.70375 per night
        let q = price(&card("350.50", "15.75"), date("2024-03-01"), date("2024-03-04"), 1).unwrap();
        assert_eq!(q.selling_price_per_night.to_string(), "405.70");
        // 405.70375 * 3 = 1217.11125, not 405.70 * 3
        assert_eq!(q.total_selling_price.to_string(), "1217.11");
    }

    #[test]
    fn rejects_equal_and_inverted_dates() {
        let c = card("100", "10");
        for (a, b) in [("2024-05-10", "2024-05-10"), ("2024-05-10", "2024-05-09")] {
            assert!(matches!(
                price(&c, date(a), date(b), 1),
                Err(EngineError::InvalidDateRange { .. })
            ));
        }
    }

    #[test]
    fn rejects_zero_rooms() {
        assert!(matches!(
            price(&card("100", "10"), date("2024-05-10"), date("2024-05-11"), 0),
            Err(EngineError::InvalidRoomCount(0))
        ));
    }

    #[test]
    fn unrepresentable_nightly_rate_is_an_error() {
        let mut c = card("1", "20");
        c.base_price = Decimal::MAX;
        assert!(matches!(
            price(&c, date("2024-01-01"), date("2024-01-02"), 1),
            Err(EngineError::InvalidRateCard(_))
        ));
        assert!(selling_price_per_night(&c).is_err());
    }

    #[test]
    fn totals_beyond_decimal_range_reject_the_room_count() {
        let c = card("1000000000000000000000", "20");
        assert!(matches!(
            price(&c, date("2024-01-01"), date("2024-12-31"), 1_000_000),
            Err(EngineError::InvalidRoomCount(1_000_000))
        ));
    }

    #[test]
    fn largest_accepted_rate_card_prices_extreme_stays() {
        let c = card("10000000", "1000");
        let q = price(&c, date("2000-01-01"), date("2100-01-01"), u32::MAX).unwrap();
        assert_eq!(q.selling_price_per_night, d("110000000"));
        assert!(q.total_selling_price > q.total_base_cost);
    }

    #[test]
    fn nights_span_month_and_leap_day() {
        assert_eq!(nights(date("2024-02-28"), date("2024-03-01")).unwrap(), 2);
        assert_eq!(nights(date("2023-12-31"), date("2024-01-01")).unwrap(), 1);
    }

    #[test]
    fn selling_never_below_base_for_non_negative_markup() {
        for markup in ["0", "0.01", "5", "33.33", "100", "250"] {
            for base in ["0.01", "1", "99.99", "1234.56"] {
                let c = card(base, markup);
                let q = price(&c, date("2024-01-01"), date("2024-01-08"), 3).unwrap();
                assert!(q.selling_price_per_night >= q.base_price_per_night);
                assert!(q.total_selling_price >= q.total_base_cost);
            }
        }
    }
}
