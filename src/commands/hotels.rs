// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::engine::{pricing, Engine};
use crate::models::{MealPackage, NewRateCard, RateCard, RateCardUpdate, RoomType};
use crate::money::round_money;
use crate::storage::SqliteStore;
use crate::utils::{
    arg, fmt_money, id_arg, json_flags, maybe_print_json, opt_arg, parse_decimal, parsed_arg,
    pretty_table,
};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// A rate card as listed, with the derived nightly selling price.
#[derive(Debug, Serialize)]
pub struct RateCardListing {
    #[serde(flatten)]
    pub rate_card: RateCard,
    pub selling_price_per_night: Decimal,
}

pub fn listings(engine: &Engine<SqliteStore>) -> Result<Vec<RateCardListing>> {
    let mut out = Vec::new();
    for h in engine.store().list_rate_cards()? {
        out.push(RateCardListing {
            selling_price_per_night: round_money(pricing::selling_price_per_night(&h)?),
            rate_card: h,
        });
    }
    Ok(out)
}

pub fn handle(engine: &Engine<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    let store = engine.store();
    match m.subcommand() {
        Some(("add", sub)) => {
            let h = store.insert_rate_card(&NewRateCard {
                name: arg(sub, "name")?.to_string(),
                location: arg(sub, "location")?.to_string(),
                room_type: parsed_arg::<RoomType>(sub, "room-type")?
                    .context("Missing argument --room-type")?,
                meal_package: parsed_arg::<MealPackage>(sub, "meal-package")?
                    .context("Missing argument --meal-package")?,
                base_price: parse_decimal(arg(sub, "base-price")?)?,
                markup_percentage: parse_decimal(arg(sub, "markup")?)?,
            })?;
            println!(
                "Added hotel #{} '{}' ({} {}, {} +{}%)",
                h.id, h.name, h.room_type, h.meal_package, h.base_price, h.markup_percentage
            );
        }
        Some(("list", sub)) => {
            let rows = listings(engine)?;
            let (json, jsonl) = json_flags(sub);
            if !maybe_print_json(json, jsonl, &rows)? {
                let ccy = Config::load(store)?.currency;
                let data = rows
                    .into_iter()
                    .map(|l| {
                        let h = l.rate_card;
                        vec![
                            h.id.to_string(),
                            h.name,
                            h.location,
                            h.room_type.to_string(),
                            h.meal_package.to_string(),
                            fmt_money(&h.base_price, &ccy),
                            format!("{}%", h.markup_percentage),
                            fmt_money(&l.selling_price_per_night, &ccy),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Hotel", "Location", "Room", "Meals", "Base/night", "Markup", "Selling/night"],
                        data
                    )
                );
            }
        }
        Some(("update", sub)) => {
            let id = id_arg(sub, "id")?;
            let update = RateCardUpdate {
                name: opt_arg(sub, "name").map(str::to_string),
                location: opt_arg(sub, "location").map(str::to_string),
                room_type: parsed_arg(sub, "room-type")?,
                meal_package: parsed_arg(sub, "meal-package")?,
                base_price: opt_arg(sub, "base-price").map(parse_decimal).transpose()?,
                markup_percentage: opt_arg(sub, "markup").map(parse_decimal).transpose()?,
            };
            let h = store
                .update_rate_card(id, &update)?
                .with_context(|| format!("Hotel {} not found", id))?;
            println!("Updated hotel #{} '{}'", h.id, h.name);
        }
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            engine.delete_rate_card(id)?;
            println!("Removed hotel #{}", id);
        }
        _ => {}
    }
    Ok(())
}
