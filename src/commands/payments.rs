// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::engine::Engine;
use crate::models::PaymentMethod;
use crate::storage::SqliteStore;
use crate::utils::{arg, fmt_money, id_arg, json_flags, maybe_print_json, parse_decimal, parsed_arg};
use anyhow::{Context, Result};

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => record(engine, sub),
        _ => Ok(()),
    }
}

fn record(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let booking_id = id_arg(sub, "booking")?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let method = parsed_arg::<PaymentMethod>(sub, "method")?.context("Missing argument --method")?;

    let payment = engine.record_payment(booking_id, amount, method)?;
    let (json, jsonl) = json_flags(sub);
    if !maybe_print_json(json, jsonl, &payment)? {
        let ccy = Config::load(engine.store())?.currency;
        let outstanding = engine
            .get_invoice_detail(&payment.invoice_number)?
            .map(|d| d.outstanding_balance)
            .unwrap_or_default();
        println!(
            "Recorded {} {} on invoice {} (outstanding {})",
            payment.payment_method,
            fmt_money(&payment.amount, &ccy),
            payment.invoice_number,
            fmt_money(&outstanding, &ccy)
        );
    }
    Ok(())
}
