// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use tracing::{info, warn};

use super::{Engine, pricing};
use crate::errors::{EngineError, Result};
use crate::models::{Booking, BookingSummary, Customer, NewBooking, Quote, RateCard};
use crate::storage::Store;

/// Attempts at allocating a fresh invoice number before giving up.
pub const MAX_INVOICE_ATTEMPTS: usize = 5;

fn room_count(n: i64) -> Result<u32> {
    u32::try_from(n)
        .ok()
        .filter(|n| *n > 0)
        .ok_or(EngineError::InvalidRoomCount(n))
}

impl<S: Store> Engine<S> {
    fn resolve_stay(
        &self,
        customer_id: i64,
        hotel_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rooms: i64,
    ) -> Result<(Customer, RateCard, u32, Quote)> {
        let customer = self
            .store
            .get_customer(customer_id)?
            .ok_or(EngineError::CustomerNotFound(customer_id))?;
        let rate_card = self
            .store
            .get_rate_card(hotel_id)?
            .ok_or(EngineError::RateCardNotFound(hotel_id))?;
        // dates are judged before the room count
        pricing::nights(check_in, check_out)?;
        let rooms = room_count(rooms)?;
        let quote = pricing::price(&rate_card, check_in, check_out, rooms)?;
        Ok((customer, rate_card, rooms, quote))
    }

    /// Price a stay without committing anything.
    pub fn preview_booking(
        &self,
        customer_id: i64,
        hotel_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rooms: i64,
    ) -> Result<BookingSummary> {
        let (customer, hotel, room_count, quote) =
            self.resolve_stay(customer_id, hotel_id, check_in, check_out, rooms)?;
        Ok(BookingSummary {
            customer,
            hotel,
            check_in_date: check_in,
            check_out_date: check_out,
            room_count,
            nights: quote.nights,
            base_price_per_night: quote.base_price_per_night,
            selling_price_per_night: quote.selling_price_per_night,
            total_base_cost: quote.total_base_cost,
            total_selling_price: quote.total_selling_price,
        })
    }

    /// Price a stay and commit it as a booking with a fresh invoice number.
    ///
    /// Price and invoice number are written in the same insert. A taken
    /// invoice number is regenerated up to [`MAX_INVOICE_ATTEMPTS`] times.
    pub fn create_booking(
        &self,
        customer_id: i64,
        hotel_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
        rooms: i64,
    ) -> Result<Booking> {
        let (_, _, room_count, quote) =
            self.resolve_stay(customer_id, hotel_id, check_in, check_out, rooms)?;
        let created_at = self.clock.now();

        for attempt in 1..=MAX_INVOICE_ATTEMPTS {
            let record = NewBooking {
                customer_id,
                hotel_id,
                check_in_date: check_in,
                check_out_date: check_out,
                room_count,
                total_price: quote.total_selling_price,
                invoice_number: self.invoice_numbers.next_invoice_number(created_at.date()),
                created_at,
            };
            match self.store.insert_booking(&record) {
                Ok(booking) => {
                    info!(
                        booking_id = booking.id,
                        invoice_number = %booking.invoice_number,
                        nights = quote.nights,
                        room_count,
                        total_price = %booking.total_price,
                        "booking created"
                    );
                    return Ok(booking);
                }
                Err(EngineError::InvoiceNumberTaken(taken)) => {
                    warn!(attempt, invoice_number = %taken, "invoice number collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }
        Err(EngineError::IntegrityError(format!(
            "no unique invoice number after {} attempts",
            MAX_INVOICE_ATTEMPTS
        )))
    }

    pub fn list_bookings(&self) -> Result<Vec<Booking>> {
        self.store.list_bookings()
    }
}
