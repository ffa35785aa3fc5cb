// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::Engine;
use crate::models::{CustomerUpdate, NewCustomer};
use crate::storage::SqliteStore;
use crate::utils::{arg, id_arg, json_flags, maybe_print_json, opt_arg, pretty_table};
use anyhow::{Context, Result};

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    let store = engine.store();
    match m.subcommand() {
        Some(("add", sub)) => {
            let c = store.insert_customer(&NewCustomer {
                name: arg(sub, "name")?.to_string(),
                address: arg(sub, "address")?.to_string(),
                phone: arg(sub, "phone")?.to_string(),
                email: arg(sub, "email")?.to_string(),
            })?;
            println!("Added customer #{} '{}'", c.id, c.name);
        }
        Some(("list", sub)) => {
            let customers = store.list_customers()?;
            let (json, jsonl) = json_flags(sub);
            if !maybe_print_json(json, jsonl, &customers)? {
                let data = customers
                    .into_iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name,
                            c.phone,
                            c.email,
                            c.address,
                            c.created_at.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Phone", "Email", "Address", "Created"], data)
                );
            }
        }
        Some(("update", sub)) => {
            let id = id_arg(sub, "id")?;
            let update = CustomerUpdate {
                name: opt_arg(sub, "name").map(str::to_string),
                address: opt_arg(sub, "address").map(str::to_string),
                phone: opt_arg(sub, "phone").map(str::to_string),
                email: opt_arg(sub, "email").map(str::to_string),
            };
            let c = store
                .update_customer(id, &update)?
                .with_context(|| format!("Customer {} not found", id))?;
            println!("Updated customer #{} '{}'", c.id, c.name);
        }
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            engine.delete_customer(id)?;
            println!("Removed customer #{}", id);
        }
        _ => {}
    }
    Ok(())
}
