// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::engine::Engine;
use crate::storage::SqliteStore;
use crate::utils::{arg, fmt_money, json_flags, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(engine, sub),
        _ => Ok(()),
    }
}

fn show(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let number = arg(sub, "number")?;
    let Some(detail) = engine.get_invoice_detail(number)? else {
        // not finding an invoice is an ordinary search outcome
        println!("No invoice '{}'", number);
        return Ok(());
    };
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &detail)? {
        return Ok(());
    }

    let ccy = Config::load(engine.store())?.currency;
    let b = &detail.booking;
    let header = vec![
        vec!["Invoice".into(), b.invoice_number.clone()],
        vec!["Issued".into(), b.created_at.to_string()],
        vec![
            "Customer".into(),
            format!("{} <{}>", detail.customer.name, detail.customer.email),
        ],
        vec![
            "Hotel".into(),
            format!(
                "{} ({}, {} {})",
                detail.hotel.name,
                detail.hotel.location,
                detail.hotel.room_type,
                detail.hotel.meal_package
            ),
        ],
        vec![
            "Stay".into(),
            format!(
                "{} to {}, {} room(s)",
                b.check_in_date, b.check_out_date, b.room_count
            ),
        ],
        vec!["Total".into(), fmt_money(&b.total_price, &ccy)],
        vec!["Paid".into(), fmt_money(&detail.total_paid, &ccy)],
        vec!["Outstanding".into(), fmt_money(&detail.outstanding_balance, &ccy)],
        vec![
            "Status".into(),
            (if detail.is_settled() { "settled" } else { "open" }).to_string(),
        ],
    ];
    println!("{}", pretty_table(&["Invoice", ""], header));

    if !detail.payments.is_empty() {
        let rows = detail
            .payments
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.payment_date.to_string(),
                    p.payment_method.to_string(),
                    fmt_money(&p.amount, &ccy),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Payment", "Date", "Method", "Amount"], rows));
    }
    Ok(())
}
