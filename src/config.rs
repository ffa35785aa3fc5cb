// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime settings: environment for process-level knobs, the `settings`
//! table for everything that should survive between runs.

use serde::Serialize;

use crate::engine::invoice::{validate_prefix, DEFAULT_INVOICE_PREFIX};
use crate::errors::{EngineError, Result};
use crate::storage::SqliteStore;

/// Log filter directive, e.g. `HOTELBOOK_LOG=hotelbook=debug`.
pub const LOG_ENV: &str = "HOTELBOOK_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub const DEFAULT_CURRENCY: &str = "SAR";

const CURRENCY_KEY: &str = "currency";
const INVOICE_PREFIX_KEY: &str = "invoice_prefix";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub currency: String,
    pub invoice_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn load(store: &SqliteStore) -> Result<Self> {
        let d = Config::default();
        Ok(Self {
            currency: store.get_setting(CURRENCY_KEY)?.unwrap_or(d.currency),
            invoice_prefix: store
                .get_setting(INVOICE_PREFIX_KEY)?
                .unwrap_or(d.invoice_prefix),
        })
    }
}

pub fn set_currency(store: &SqliteStore, ccy: &str) -> Result<String> {
    let ccy = ccy.trim().to_uppercase();
    if ccy.len() != 3 || !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EngineError::InvalidSetting(format!(
            "currency '{}' must be a 3-letter code",
            ccy
        )));
    }
    store.set_setting(CURRENCY_KEY, &ccy)?;
    Ok(ccy)
}

pub fn set_invoice_prefix(store: &SqliteStore, prefix: &str) -> Result<String> {
    validate_prefix(prefix)?;
    let prefix = prefix.trim().to_ascii_uppercase();
    store.set_setting(INVOICE_PREFIX_KEY, &prefix)?;
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_until_set() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(Config::load(&store).unwrap(), Config::default());

        assert_eq!(set_currency(&store, "usd").unwrap(), "USD");
        assert_eq!(set_invoice_prefix(&store, "hb").unwrap(), "HB");
        let cfg = Config::load(&store).unwrap();
        assert_eq!(cfg.currency, "USD");
        assert_eq!(cfg.invoice_prefix, "HB");
    }

    #[test]
    fn rejects_bad_values() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(set_currency(&store, "RIYAL").is_err());
        assert!(set_invoice_prefix(&store, "IN V").is_err());
        assert_eq!(Config::load(&store).unwrap(), Config::default());
    }
}
