// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ArgMatches;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::money::round_money;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Required string argument. clap enforces presence, this only avoids a panic
/// when a handler is driven with matches from a different command.
pub fn arg<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("Missing argument --{}", id))
}

pub fn opt_arg<'a>(m: &'a ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id).map(String::as_str)
}

pub fn id_arg(m: &ArgMatches, id: &str) -> Result<i64> {
    let s = arg(m, id)?;
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}' for --{}", s, id))
}

pub fn parsed_arg<T>(m: &ArgMatches, id: &str) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    opt_arg(m, id)
        .map(|s| T::from_str(s).map_err(anyhow::Error::msg))
        .transpose()
        .with_context(|| format!("Invalid value for --{}", id))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, round_money(*d))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// `--json` / `--jsonl` flags, tolerating subcommands that do not define them.
pub fn json_flags(m: &ArgMatches) -> (bool, bool) {
    let flag = |id: &str| matches!(m.try_get_one::<bool>(id), Ok(Some(true)));
    (flag("json"), flag("jsonl"))
}
