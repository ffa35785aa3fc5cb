// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Booking pricing and invoice reconciliation engine.
//!
//! [`Engine`] is the surface the CLI (or any other transport) talks to. It owns
//! no data; every operation reads from or appends to the injected [`Store`].

pub mod booking;
pub mod invoice;
pub mod ledger;
pub mod pricing;
pub mod reports;

use chrono::{NaiveDateTime, Timelike, Utc};
use std::sync::{Arc, Mutex};

use crate::storage::Store;
use invoice::{InvoiceNumberGenerator, UuidInvoiceNumbers};
use ledger::InvoiceLocks;

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC, truncated to whole seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Utc::now().naive_utc();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { now: Mutex::new(at) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        match self.now.lock() {
            Ok(mut g) => *g = at,
            Err(poisoned) => *poisoned.into_inner() = at,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

pub struct Engine<S> {
    store: S,
    invoice_numbers: Box<dyn InvoiceNumberGenerator>,
    clock: Arc<dyn Clock>,
    locks: InvoiceLocks,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            invoice_numbers: Box::new(UuidInvoiceNumbers::default()),
            clock: Arc::new(SystemClock),
            locks: InvoiceLocks::default(),
        }
    }

    pub fn with_invoice_numbers(mut self, generator: impl InvoiceNumberGenerator + 'static) -> Self {
        self.invoice_numbers = Box::new(generator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
