// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{pricing, Engine};
use crate::money;
use crate::storage::SqliteStore;
use crate::utils::{json_flags, maybe_print_json, pretty_table};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn find_issues(engine: &Engine<SqliteStore>) -> Result<Vec<Issue>> {
    let snap = engine.snapshot()?;
    let mut issues = Vec::new();

    for b in &snap.bookings {
        // 1) stored total no longer matches the rate card
        match snap.rate_cards.get(&b.hotel_id) {
            Some(h) => {
                match pricing::price(h, b.check_in_date, b.check_out_date, b.room_count) {
                    Ok(q) if q.total_selling_price != money::round_money(b.total_price) => {
                        issues.push(Issue {
                            kind: "pricing_drift",
                            detail: format!(
                                "{} stored {} current quote {}",
                                b.invoice_number, b.total_price, q.total_selling_price
                            ),
                        });
                    }
                    Ok(_) => {}
                    Err(e) => issues.push(Issue {
                        kind: "unpriceable_booking",
                        detail: format!("{}: {}", b.invoice_number, e),
                    }),
                }
            }
            None => issues.push(Issue {
                kind: "missing_hotel",
                detail: format!("{} hotel {}", b.invoice_number, b.hotel_id),
            }),
        }
        if !snap.customers.contains_key(&b.customer_id) {
            issues.push(Issue {
                kind: "missing_customer",
                detail: format!("{} customer {}", b.invoice_number, b.customer_id),
            });
        }

        // 2) payments carrying another invoice's number
        let payments = snap.payments.get(&b.id).map(Vec::as_slice).unwrap_or(&[]);
        for p in payments.iter().filter(|p| p.invoice_number != b.invoice_number) {
            issues.push(Issue {
                kind: "payment_invoice_mismatch",
                detail: format!(
                    "payment {} says {} but booking has {}",
                    p.id, p.invoice_number, b.invoice_number
                ),
            });
        }

        // 3) paid more than the total
        let paid = snap.paid(b.id);
        if money::round_money(paid) > money::round_money(b.total_price) {
            issues.push(Issue {
                kind: "overpaid_invoice",
                detail: format!(
                    "{} total {} paid {}",
                    b.invoice_number, b.total_price, paid
                ),
            });
        }
    }
    Ok(issues)
}

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    let issues = find_issues(engine)?;
    let (json, jsonl) = json_flags(m);
    if maybe_print_json(json, jsonl, &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
