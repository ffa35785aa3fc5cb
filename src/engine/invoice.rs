// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{EngineError, Result};

pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Source of candidate invoice numbers.
///
/// Candidates only need to be unlikely to collide: the store's uniqueness
/// constraint is the final arbiter and the booking factory regenerates on
/// conflict.
pub trait InvoiceNumberGenerator: Send + Sync {
    fn next_invoice_number(&self, issued_on: NaiveDate) -> String;
}

/// `PREFIX-YYYYMMDD-XXXXXXXXXXXX`, the suffix being 48 random bits of a v4 UUID.
#[derive(Debug, Clone)]
pub struct UuidInvoiceNumbers {
    prefix: String,
}

impl UuidInvoiceNumbers {
    pub fn new(prefix: &str) -> Result<Self> {
        validate_prefix(prefix)?;
        Ok(Self {
            prefix: prefix.trim().to_ascii_uppercase(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for UuidInvoiceNumbers {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_INVOICE_PREFIX.to_string(),
        }
    }
}

impl InvoiceNumberGenerator for UuidInvoiceNumbers {
    fn next_invoice_number(&self, issued_on: NaiveDate) -> String {
        let id = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
        format!(
            "{}-{}-{}",
            self.prefix,
            issued_on.format("%Y%m%d"),
            &id[..12]
        )
    }
}

pub fn validate_prefix(prefix: &str) -> Result<()> {
    let p = prefix.trim();
    if p.is_empty() || p.len() > 12 || !p.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EngineError::InvalidSetting(format!(
            "invoice prefix '{}' must be 1-12 ASCII letters or digits",
            prefix
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn format_is_prefix_date_suffix() {
        let g = UuidInvoiceNumbers::new("inv").unwrap();
        let n = g.next_invoice_number(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1], "20240105");
        assert_eq!(parts[2].len(), 12);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn rapid_generation_does_not_repeat() {
        let g = UuidInvoiceNumbers::default();
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let seen: HashSet<String> = (0..10_000).map(|_| g.next_invoice_number(day)).collect();
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn prefix_rules() {
        assert!(UuidInvoiceNumbers::new("HB2024").is_ok());
        assert!(UuidInvoiceNumbers::new("").is_err());
        assert!(UuidInvoiceNumbers::new("IN-V").is_err());
        assert!(UuidInvoiceNumbers::new("ABCDEFGHIJKLM").is_err());
    }
}
