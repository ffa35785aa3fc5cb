// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Config};
use crate::engine::Engine;
use crate::storage::SqliteStore;
use crate::utils::{arg, json_flags, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    let store = engine.store();
    match m.subcommand() {
        Some(("show", sub)) => {
            let cfg = Config::load(store)?;
            let (json, jsonl) = json_flags(sub);
            if !maybe_print_json(json, jsonl, &cfg)? {
                let rows = vec![
                    vec!["currency".into(), cfg.currency],
                    vec!["invoice_prefix".into(), cfg.invoice_prefix],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("set-currency", sub)) => {
            let ccy = config::set_currency(store, arg(sub, "code")?)?;
            println!("Currency set to {}", ccy);
        }
        Some(("set-invoice-prefix", sub)) => {
            let prefix = config::set_invoice_prefix(store, arg(sub, "prefix")?)?;
            println!("New invoices will be numbered {}-YYYYMMDD-...", prefix);
        }
        _ => {}
    }
    Ok(())
}
