// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::engine::Engine;
use crate::models::{MonthlyFilter, ProfitLossRow};
use crate::money;
use crate::storage::SqliteStore;
use crate::utils::{fmt_money, json_flags, maybe_print_json, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("profit-loss", sub)) => profit_loss(engine, sub)?,
        Some(("monthly", sub)) => monthly(engine, sub)?,
        Some(("outstanding", sub)) => outstanding(engine, sub)?,
        _ => {}
    }
    Ok(())
}

/// Column totals for the profit/loss table: base cost, selling price, profit.
pub fn profit_loss_totals(rows: &[ProfitLossRow]) -> (Decimal, Decimal, Decimal) {
    (
        money::sum(rows.iter().map(|r| &r.base_cost)),
        money::sum(rows.iter().map(|r| &r.selling_price)),
        money::sum(rows.iter().map(|r| &r.profit)),
    )
}

fn profit_loss(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let rows = engine.profit_loss_report()?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &rows)? {
        return Ok(());
    }
    let ccy = Config::load(engine.store())?.currency;
    let (base, selling, profit) = profit_loss_totals(&rows);
    let mut data: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.invoice_number.clone(),
                r.customer_name.clone(),
                r.hotel_name.clone(),
                fmt_money(&r.base_cost, &ccy),
                fmt_money(&r.selling_price, &ccy),
                fmt_money(&r.profit, &ccy),
                r.booking_date.date().to_string(),
            ]
        })
        .collect();
    data.push(vec![
        "TOTAL".into(),
        String::new(),
        String::new(),
        fmt_money(&base, &ccy),
        fmt_money(&selling, &ccy),
        fmt_money(&profit, &ccy),
        String::new(),
    ]);
    println!(
        "{}",
        pretty_table(
            &["Invoice", "Customer", "Hotel", "Base cost", "Selling", "Profit", "Booked"],
            data
        )
    );
    Ok(())
}

fn monthly(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let filter = MonthlyFilter {
        year: sub.get_one::<i32>("year").copied(),
        month: sub.get_one::<u32>("month").copied(),
    };
    let rows = engine.monthly_report(Some(filter))?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &rows)? {
        return Ok(());
    }
    let ccy = Config::load(engine.store())?.currency;
    let data = rows
        .iter()
        .map(|r| {
            vec![
                format!("{}-{:02}", r.year, r.month),
                r.booking_count.to_string(),
                fmt_money(&r.total_revenue, &ccy),
                fmt_money(&r.total_profit, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Bookings", "Revenue", "Profit"], data)
    );
    Ok(())
}

fn outstanding(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let rows = engine.outstanding_invoices()?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &rows)? {
        return Ok(());
    }
    if rows.is_empty() {
        println!("No outstanding invoices");
        return Ok(());
    }
    let ccy = Config::load(engine.store())?.currency;
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.invoice_number.clone(),
                r.customer_name.clone(),
                r.hotel_name.clone(),
                fmt_money(&r.total_amount, &ccy),
                fmt_money(&r.paid_amount, &ccy),
                fmt_money(&r.outstanding_amount, &ccy),
                r.booking_date.date().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Invoice", "Customer", "Hotel", "Total", "Paid", "Outstanding", "Booked"],
            data
        )
    );
    Ok(())
}
