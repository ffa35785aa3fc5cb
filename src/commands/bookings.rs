// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::engine::Engine;
use crate::storage::SqliteStore;
use crate::utils::{arg, fmt_money, id_arg, json_flags, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result};
use chrono::NaiveDate;

struct Stay {
    customer_id: i64,
    hotel_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
    rooms: i64,
}

fn stay(sub: &clap::ArgMatches) -> Result<Stay> {
    let rooms = arg(sub, "rooms")?;
    Ok(Stay {
        customer_id: id_arg(sub, "customer")?,
        hotel_id: id_arg(sub, "hotel")?,
        check_in: parse_date(arg(sub, "check-in")?)?,
        check_out: parse_date(arg(sub, "check-out")?)?,
        rooms: rooms
            .trim()
            .parse()
            .with_context(|| format!("Invalid room count '{}'", rooms))?,
    })
}

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("preview", sub)) => preview(engine, sub),
        Some(("create", sub)) => create(engine, sub),
        Some(("list", sub)) => list(engine, sub),
        _ => Ok(()),
    }
}

fn preview(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let s = stay(sub)?;
    let summary =
        engine.preview_booking(s.customer_id, s.hotel_id, s.check_in, s.check_out, s.rooms)?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &summary)? {
        return Ok(());
    }
    let ccy = Config::load(engine.store())?.currency;
    let rows = vec![
        vec!["Customer".into(), summary.customer.name.clone()],
        vec![
            "Hotel".into(),
            format!(
                "{} ({}, {} {})",
                summary.hotel.name,
                summary.hotel.location,
                summary.hotel.room_type,
                summary.hotel.meal_package
            ),
        ],
        vec![
            "Stay".into(),
            format!("{} to {}", summary.check_in_date, summary.check_out_date),
        ],
        vec!["Nights".into(), summary.nights.to_string()],
        vec!["Rooms".into(), summary.room_count.to_string()],
        vec!["Base / night".into(), fmt_money(&summary.base_price_per_night, &ccy)],
        vec!["Selling / night".into(), fmt_money(&summary.selling_price_per_night, &ccy)],
        vec!["Total base cost".into(), fmt_money(&summary.total_base_cost, &ccy)],
        vec!["Total price".into(), fmt_money(&summary.total_selling_price, &ccy)],
    ];
    println!("{}", pretty_table(&["Preview", ""], rows));
    Ok(())
}

fn create(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let s = stay(sub)?;
    let booking =
        engine.create_booking(s.customer_id, s.hotel_id, s.check_in, s.check_out, s.rooms)?;
    let (json, jsonl) = json_flags(sub);
    if !maybe_print_json(json, jsonl, &booking)? {
        let ccy = Config::load(engine.store())?.currency;
        println!(
            "Booked #{} invoice {} total {}",
            booking.id,
            booking.invoice_number,
            fmt_money(&booking.total_price, &ccy)
        );
    }
    Ok(())
}

fn list(engine: &Engine<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let bookings = engine.list_bookings()?;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &bookings)? {
        return Ok(());
    }
    let ccy = Config::load(engine.store())?.currency;
    let data = bookings
        .into_iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.invoice_number,
                b.customer_id.to_string(),
                b.hotel_id.to_string(),
                b.check_in_date.to_string(),
                b.check_out_date.to_string(),
                b.room_count.to_string(),
                fmt_money(&b.total_price, &ccy),
                b.created_at.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Invoice", "Customer", "Hotel", "Check-in", "Check-out", "Rooms", "Total", "Created"],
            data
        )
    );
    Ok(())
}
