// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use hotelbook::config::{Config, DEFAULT_LOG_FILTER, LOG_ENV};
use hotelbook::engine::invoice::UuidInvoiceNumbers;
use hotelbook::{cli, commands, db, Engine, SqliteStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // stdout is reserved for tables and JSON
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let path = db::db_path()?;
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    let cfg = Config::load(&store)?;
    let engine = Engine::new(store).with_invoice_numbers(UuidInvoiceNumbers::new(&cfg.invoice_prefix)?);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("config", sub)) => commands::settings::handle(&engine, sub)?,
        Some(("customer", sub)) => commands::customers::handle(&engine, sub)?,
        Some(("hotel", sub)) => commands::hotels::handle(&engine, sub)?,
        Some(("booking", sub)) => commands::bookings::handle(&engine, sub)?,
        Some(("invoice", sub)) => commands::invoices::handle(&engine, sub)?,
        Some(("payment", sub)) => commands::payments::handle(&engine, sub)?,
        Some(("report", sub)) => commands::reports::handle(&engine, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&engine, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&engine, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
