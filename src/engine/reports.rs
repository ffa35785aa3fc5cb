// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only financial views.
//!
//! Every report is recomputed from a [`LedgerSnapshot`] of all bookings and
//! payments. The aggregation functions are pure so they can be exercised
//! without a store.

use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::{Engine, pricing};
use crate::errors::{EngineError, Result};
use crate::models::{
    Booking, Customer, MonthlyFilter, MonthlyRow, OutstandingRow, Payment, ProfitLossRow, RateCard,
};
use crate::money::{self, round_money};
use crate::storage::Store;

/// Bookings with everything they join to, read in one pass.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub bookings: Vec<Booking>,
    pub customers: HashMap<i64, Customer>,
    pub rate_cards: HashMap<i64, RateCard>,
    pub payments: HashMap<i64, Vec<Payment>>,
}

impl LedgerSnapshot {
    pub fn load<S: Store + ?Sized>(store: &S) -> Result<Self> {
        let bookings = store.list_bookings()?;
        let mut snap = LedgerSnapshot {
            bookings: Vec::with_capacity(bookings.len()),
            ..Default::default()
        };
        for b in &bookings {
            if let Entry::Vacant(e) = snap.customers.entry(b.customer_id) {
                if let Some(c) = store.get_customer(b.customer_id)? {
                    e.insert(c);
                }
            }
            if let Entry::Vacant(e) = snap.rate_cards.entry(b.hotel_id) {
                if let Some(h) = store.get_rate_card(b.hotel_id)? {
                    e.insert(h);
                }
            }
            snap.payments
                .insert(b.id, store.list_payments_for_booking(b.id)?);
        }
        snap.bookings = bookings;
        Ok(snap)
    }

    fn customer(&self, b: &Booking) -> Result<&Customer> {
        self.customers.get(&b.customer_id).ok_or_else(|| {
            EngineError::IntegrityError(format!(
                "booking {} references missing customer {}",
                b.id, b.customer_id
            ))
        })
    }

    fn rate_card(&self, b: &Booking) -> Result<&RateCard> {
        self.rate_cards.get(&b.hotel_id).ok_or_else(|| {
            EngineError::IntegrityError(format!(
                "booking {} references missing hotel {}",
                b.id, b.hotel_id
            ))
        })
    }

    pub fn paid(&self, booking_id: i64) -> Decimal {
        self.payments
            .get(&booking_id)
            .map(|ps| money::sum(ps.iter().map(|p| &p.amount)))
            .unwrap_or(Decimal::ZERO)
    }
}

fn out_of_range(b: &Booking, what: &str) -> EngineError {
    EngineError::IntegrityError(format!(
        "{} for booking {} exceeds the representable range",
        what, b.id
    ))
}

/// Base cost recomputed from the rate card and stay, independent of the
/// booking's stored total.
pub fn base_cost(booking: &Booking, rate_card: &RateCard) -> Result<Decimal> {
    let nights = pricing::nights(booking.check_in_date, booking.check_out_date)?;
    let units = Decimal::from(u64::from(nights) * u64::from(booking.room_count));
    rate_card
        .base_price
        .checked_mul(units)
        .map(round_money)
        .ok_or_else(|| out_of_range(booking, "base cost"))
}

fn profit(b: &Booking, base: Decimal) -> Result<Decimal> {
    b.total_price
        .checked_sub(base)
        .ok_or_else(|| out_of_range(b, "profit"))
}

pub fn profit_loss(snap: &LedgerSnapshot) -> Result<Vec<ProfitLossRow>> {
    snap.bookings
        .iter()
        .map(|b| {
            let customer = snap.customer(b)?;
            let hotel = snap.rate_card(b)?;
            let base = base_cost(b, hotel)?;
            Ok(ProfitLossRow {
                invoice_number: b.invoice_number.clone(),
                customer_name: customer.name.clone(),
                hotel_name: hotel.name.clone(),
                base_cost: base,
                selling_price: round_money(b.total_price),
                profit: round_money(profit(b, base)?),
                booking_date: b.created_at,
            })
        })
        .collect()
}

pub fn validate_filter(filter: &MonthlyFilter) -> Result<()> {
    if let Some(m) = filter.month {
        if !(1..=12).contains(&m) {
            return Err(EngineError::InvalidReportFilter(format!(
                "month {} is not in 1-12",
                m
            )));
        }
    }
    Ok(())
}

/// Bookings grouped by the year and month they were created in, ascending.
pub fn monthly(snap: &LedgerSnapshot, filter: &MonthlyFilter) -> Result<Vec<MonthlyRow>> {
    validate_filter(filter)?;
    let mut groups: BTreeMap<(i32, u32), (u64, Decimal, Decimal)> = BTreeMap::new();
    for b in &snap.bookings {
        let (year, month) = (b.created_at.year(), b.created_at.month());
        if filter.year.is_some_and(|y| y != year) || filter.month.is_some_and(|m| m != month) {
            continue;
        }
        let margin = profit(b, base_cost(b, snap.rate_card(b)?)?)?;
        let g = groups.entry((year, month)).or_default();
        g.0 += 1;
        g.1 = g
            .1
            .checked_add(b.total_price)
            .ok_or_else(|| out_of_range(b, "monthly revenue"))?;
        g.2 = g
            .2
            .checked_add(margin)
            .ok_or_else(|| out_of_range(b, "monthly profit"))?;
    }
    Ok(groups
        .into_iter()
        .map(|((year, month), (count, revenue, profit))| MonthlyRow {
            year,
            month,
            booking_count: count,
            total_revenue: round_money(revenue),
            total_profit: round_money(profit),
        })
        .collect())
}

/// Invoices with a balance left after rounding to the minor unit.
pub fn outstanding(snap: &LedgerSnapshot) -> Result<Vec<OutstandingRow>> {
    let mut rows = Vec::new();
    for b in &snap.bookings {
        let paid = snap.paid(b.id);
        if !money::is_outstanding(b.total_price, paid) {
            continue;
        }
        rows.push(OutstandingRow {
            invoice_number: b.invoice_number.clone(),
            customer_name: snap.customer(b)?.name.clone(),
            hotel_name: snap.rate_card(b)?.name.clone(),
            total_amount: round_money(b.total_price),
            paid_amount: round_money(paid),
            outstanding_amount: money::outstanding(b.total_price, paid),
            booking_date: b.created_at,
        });
    }
    Ok(rows)
}

impl<S: Store> Engine<S> {
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        LedgerSnapshot::load(&self.store)
    }

    pub fn profit_loss_report(&self) -> Result<Vec<ProfitLossRow>> {
        let rows = profit_loss(&self.snapshot()?)?;
        debug!(rows = rows.len(), "profit/loss report");
        Ok(rows)
    }

    pub fn monthly_report(&self, filter: Option<MonthlyFilter>) -> Result<Vec<MonthlyRow>> {
        let filter = filter.unwrap_or_default();
        let rows = monthly(&self.snapshot()?, &filter)?;
        debug!(rows = rows.len(), year = ?filter.year, month = ?filter.month, "monthly report");
        Ok(rows)
    }

    pub fn outstanding_invoices(&self) -> Result<Vec<OutstandingRow>> {
        let rows = outstanding(&self.snapshot()?)?;
        debug!(rows = rows.len(), "outstanding invoices");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealPackage, PaymentMethod, RoomType};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn booking(id: i64, total: Decimal, created: NaiveDateTime) -> Booking {
        Booking {
            id,
            customer_id: 1,
            hotel_id: 1,
            check_in_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            room_count: 2,
            total_price: total,
            invoice_number: format!("INV-{}", id),
            created_at: created,
        }
    }

    fn payment(booking_id: i64, amount: Decimal) -> Payment {
        Payment {
            id: 0,
            booking_id,
            invoice_number: format!("INV-{}", booking_id),
            amount,
            payment_method: PaymentMethod::Cash,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            created_at: ts(2024, 1, 2),
        }
    }

    fn snapshot(bookings: Vec<Booking>, payments: Vec<Payment>) -> LedgerSnapshot {
        let mut snap = LedgerSnapshot::default();
        snap.customers.insert(
            1,
            Customer {
                id: 1,
                name: "Aisha".into(),
                address: "Jeddah".into(),
                phone: "0500000000".into(),
                email: "aisha@example.com".into(),
                created_at: ts(2023, 12, 1),
            },
        );
        snap.rate_cards.insert(
            1,
            RateCard {
                id: 1,
                name: "Hilton Makkah".into(),
                location: "Makkah".into(),
                room_type: RoomType::Double,
                meal_package: MealPackage::Fullboard,
                base_price: dec!(200),
                markup_percentage: dec!(20),
                created_at: ts(2023, 12, 1),
            },
        );
        for p in payments {
            snap.payments.entry(p.booking_id).or_default().push(p);
        }
        snap.bookings = bookings;
        snap
    }

    #[test]
    fn profit_uses_recomputed_base_cost() {
        let snap = snapshot(vec![booking(1, dec!(960), ts(2024, 1, 1))], vec![]);
        let rows = profit_loss(&snap).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_cost, dec!(800));
        assert_eq!(rows[0].profit, dec!(160));
        assert_eq!(rows[0].customer_name, "Aisha");
        assert_eq!(rows[0].hotel_name, "Hilton Makkah");
    }

    #[test]
    fn monthly_groups_ascending_and_filters() {
        let snap = snapshot(
            vec![
                booking(1, dec!(960), ts(2024, 2, 3)),
                booking(2, dec!(960), ts(2024, 1, 10)),
                booking(3, dec!(1000), ts(2024, 1, 31)),
                booking(4, dec!(960), ts(2023, 1, 15)),
            ],
            vec![],
        );
        let all = monthly(&snap, &MonthlyFilter::default()).unwrap();
        let keys: Vec<_> = all.iter().map(|r| (r.year, r.month)).collect();
        assert_eq!(keys, vec![(2023, 1), (2024, 1), (2024, 2)]);

        let jan = monthly(
            &snap,
            &MonthlyFilter {
                year: Some(2024),
                month: Some(1),
            },
        )
        .unwrap();
        assert_eq!(jan.len(), 1);
        assert_eq!(jan[0].booking_count, 2);
        assert_eq!(jan[0].total_revenue, dec!(1960));
        assert_eq!(jan[0].total_profit, dec!(360));

        let januaries = monthly(
            &snap,
            &MonthlyFilter {
                year: None,
                month: Some(1),
            },
        )
        .unwrap();
        assert_eq!(januaries.len(), 2);
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let snap = snapshot(vec![], vec![]);
        for m in [0, 13] {
            let f = MonthlyFilter {
                year: None,
                month: Some(m),
            };
            assert!(matches!(
                monthly(&snap, &f),
                Err(EngineError::InvalidReportFilter(_))
            ));
        }
    }

    #[test]
    fn outstanding_ignores_sub_cent_residue() {
        let snap = snapshot(
            vec![
                booking(1, dec!(1000), ts(2024, 1, 1)),
                booking(2, dec!(800), ts(2024, 1, 1)),
                booking(3, dec!(960), ts(2024, 1, 1)),
            ],
            vec![
                payment(1, dec!(999.9999999999)),
                payment(2, dec!(600)),
                payment(3, dec!(960)),
            ],
        );
        let rows = outstanding(&snap).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].invoice_number, "INV-2");
        assert_eq!(rows[0].paid_amount, dec!(600));
        assert_eq!(rows[0].outstanding_amount, dec!(200));
    }

    #[test]
    fn unrepresentable_base_cost_is_an_integrity_error() {
        let mut snap = snapshot(vec![booking(1, dec!(960), ts(2024, 1, 1))], vec![]);
        if let Some(h) = snap.rate_cards.get_mut(&1) {
            h.base_price = Decimal::MAX;
        }
        assert!(matches!(
            profit_loss(&snap),
            Err(EngineError::IntegrityError(_))
        ));
        assert!(matches!(
            monthly(&snap, &MonthlyFilter::default()),
            Err(EngineError::IntegrityError(_))
        ));
    }

    #[test]
    fn monthly_revenue_overflow_is_an_integrity_error() {
        let snap = snapshot(
            vec![
                booking(1, Decimal::MAX, ts(2024, 1, 1)),
                booking(2, Decimal::MAX, ts(2024, 1, 2)),
            ],
            vec![],
        );
        assert!(matches!(
            monthly(&snap, &MonthlyFilter::default()),
            Err(EngineError::IntegrityError(_))
        ));
    }

    #[test]
    fn missing_rate_card_is_an_integrity_error() {
        let mut snap = snapshot(vec![booking(1, dec!(960), ts(2024, 1, 1))], vec![]);
        snap.rate_cards.clear();
        assert!(matches!(
            profit_loss(&snap),
            Err(EngineError::IntegrityError(_))
        ));
    }
}
