// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::Engine;
use crate::errors::{EngineError, Result};
use crate::models::{InvoiceDetail, NewPayment, Payment, PaymentMethod};
use crate::money;
use crate::storage::Store;

/// One mutex per invoice number, created on demand.
#[derive(Debug, Default)]
pub(crate) struct InvoiceLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InvoiceLocks {
    fn table(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::IntegrityError("invoice lock table poisoned".into()))
    }

    /// Run `f` while holding the lock for `invoice_number`.
    pub(crate) fn with_invoice_lock<T>(
        &self,
        invoice_number: &str,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let lock = self
            .table()?
            .entry(invoice_number.to_string())
            .or_default()
            .clone();

        let out = {
            // poisoned only means an earlier holder panicked
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f()
        };

        // drop the entry once nobody else is waiting on it
        let mut table = self.table()?;
        if Arc::strong_count(&lock) == 2 {
            table.remove(invoice_number);
        }
        out
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table().map(|t| t.len()).unwrap_or(0)
    }
}

impl<S: Store> Engine<S> {
    /// Append a payment to a booking's invoice.
    ///
    /// Reading the balance, validating and appending happen under the
    /// invoice's lock, so concurrent payments can not jointly overpay.
    pub fn record_payment(
        &self,
        booking_id: i64,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment> {
        let booking = self
            .store
            .get_booking(booking_id)?
            .ok_or(EngineError::BookingNotFound(booking_id))?;

        self.locks.with_invoice_lock(&booking.invoice_number, || {
            let payments = self.store.list_payments_for_booking(booking.id)?;
            let paid = money::sum(payments.iter().map(|p| &p.amount));
            if let Err(e) = money::check_payment(booking.total_price, paid, amount) {
                if let EngineError::OverpaymentRejected { outstanding, requested } = &e {
                    warn!(
                        invoice_number = %booking.invoice_number,
                        outstanding = %outstanding,
                        requested = %requested,
                        "overpayment rejected"
                    );
                }
                return Err(e);
            }

            let now = self.clock.now();
            let payment = self.store.insert_payment(&NewPayment {
                booking_id: booking.id,
                invoice_number: booking.invoice_number.clone(),
                amount: money::round_money(amount),
                payment_method: method,
                payment_date: now.date(),
                created_at: now,
            })?;
            info!(
                payment_id = payment.id,
                invoice_number = %payment.invoice_number,
                amount = %payment.amount,
                method = %payment.payment_method,
                outstanding = %money::outstanding(booking.total_price, paid + payment.amount),
                "payment recorded"
            );
            Ok(payment)
        })
    }

    /// Booking, parties, payments and balance for an invoice.
    /// `Ok(None)` when the invoice number is unknown.
    pub fn get_invoice_detail(&self, invoice_number: &str) -> Result<Option<InvoiceDetail>> {
        let Some(booking) = self
            .store
            .get_booking_by_invoice_number(invoice_number.trim())?
        else {
            return Ok(None);
        };
        let customer = self.store.get_customer(booking.customer_id)?.ok_or_else(|| {
            EngineError::IntegrityError(format!(
                "booking {} references missing customer {}",
                booking.id, booking.customer_id
            ))
        })?;
        let hotel = self.store.get_rate_card(booking.hotel_id)?.ok_or_else(|| {
            EngineError::IntegrityError(format!(
                "booking {} references missing hotel {}",
                booking.id, booking.hotel_id
            ))
        })?;
        let payments = self.store.list_payments_for_booking(booking.id)?;
        let total_paid = money::round_money(money::sum(payments.iter().map(|p| &p.amount)));
        let outstanding_balance = money::outstanding(booking.total_price, total_paid);

        Ok(Some(InvoiceDetail {
            booking,
            customer,
            hotel,
            payments,
            total_paid,
            outstanding_balance,
        }))
    }

    pub fn ensure_customer_deletable(&self, id: i64) -> Result<()> {
        if self.store.has_bookings_for_customer(id)? {
            return Err(EngineError::ReferentialConflict(format!(
                "customer {} has bookings and can not be deleted",
                id
            )));
        }
        Ok(())
    }

    pub fn ensure_rate_card_deletable(&self, id: i64) -> Result<()> {
        if self.store.has_bookings_for_rate_card(id)? {
            return Err(EngineError::ReferentialConflict(format!(
                "hotel {} has bookings and can not be deleted",
                id
            )));
        }
        Ok(())
    }

    pub fn delete_customer(&self, id: i64) -> Result<()> {
        self.ensure_customer_deletable(id)?;
        if !self.store.delete_customer(id)? {
            return Err(EngineError::CustomerNotFound(id));
        }
        info!(customer_id = id, "customer deleted");
        Ok(())
    }

    pub fn delete_rate_card(&self, id: i64) -> Result<()> {
        self.ensure_rate_card_deletable(id)?;
        if !self.store.delete_rate_card(id)? {
            return Err(EngineError::RateCardNotFound(id));
        }
        info!(hotel_id = id, "hotel deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn same_invoice_runs_one_at_a_time() {
        let locks = Arc::new(InvoiceLocks::default());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (locks, inside, max_seen) = (locks.clone(), inside.clone(), max_seen.clone());
                thread::spawn(move || {
                    locks
                        .with_invoice_lock("INV-1", || {
                            let n = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(n, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(5));
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn entries_are_pruned_after_use() {
        let locks = InvoiceLocks::default();
        locks.with_invoice_lock("INV-A", || Ok(())).unwrap();
        let err: Result<()> = locks.with_invoice_lock("INV-B", || {
            Err(EngineError::InvalidAmount(Decimal::ZERO))
        });
        assert!(err.is_err());
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn panicking_holder_does_not_wedge_the_invoice() {
        let locks = InvoiceLocks::default();
        let crashed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<()> = locks.with_invoice_lock("INV-P", || panic!("handler crashed"));
        }));
        assert!(crashed.is_err());

        assert_eq!(locks.with_invoice_lock("INV-P", || Ok(7)).unwrap(), 7);
        assert_eq!(locks.len(), 0);
    }
}
