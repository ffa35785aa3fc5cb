// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::Engine;
use crate::storage::SqliteStore;
use crate::utils::arg;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => bail!("Unknown format: {} (use csv|json)", other),
        }
    }
}

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("bookings", sub)) => {
            let fmt = Format::parse(arg(sub, "format")?)?;
            let out = arg(sub, "out")?;
            let n = export_bookings(engine, fmt, Path::new(out))?;
            println!("Exported {} bookings to {}", n, out);
        }
        Some(("payments", sub)) => {
            let fmt = Format::parse(arg(sub, "format")?)?;
            let out = arg(sub, "out")?;
            let n = export_payments(engine, fmt, Path::new(out))?;
            println!("Exported {} payments to {}", n, out);
        }
        _ => {}
    }
    Ok(())
}

fn write_json<T: Serialize>(out: &Path, items: &[T]) -> Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(items)?)?;
    Ok(())
}

pub fn export_bookings(engine: &Engine<SqliteStore>, fmt: Format, out: &Path) -> Result<usize> {
    let bookings = engine.list_bookings()?;
    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "invoice_number",
                "customer_id",
                "hotel_id",
                "check_in_date",
                "check_out_date",
                "room_count",
                "total_price",
                "created_at",
            ])?;
            for b in &bookings {
                wtr.write_record([
                    b.id.to_string(),
                    b.invoice_number.clone(),
                    b.customer_id.to_string(),
                    b.hotel_id.to_string(),
                    b.check_in_date.to_string(),
                    b.check_out_date.to_string(),
                    b.room_count.to_string(),
                    b.total_price.to_string(),
                    b.created_at.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => write_json(out, &bookings)?,
    }
    Ok(bookings.len())
}

pub fn export_payments(engine: &Engine<SqliteStore>, fmt: Format, out: &Path) -> Result<usize> {
    let payments = engine.store().list_payments()?;
    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "booking_id",
                "invoice_number",
                "amount",
                "payment_method",
                "payment_date",
                "created_at",
            ])?;
            for p in &payments {
                wtr.write_record([
                    p.id.to_string(),
                    p.booking_id.to_string(),
                    p.invoice_number.clone(),
                    p.amount.to_string(),
                    p.payment_method.to_string(),
                    p.payment_date.to_string(),
                    p.created_at.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => write_json(out, &payments)?,
    }
    Ok(payments.len())
}
