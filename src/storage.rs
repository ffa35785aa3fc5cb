// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record store the engine reads from and appends to.

use chrono::{NaiveDateTime, Timelike};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::db::init_schema;
use crate::errors::{EngineError, Result};
use crate::models::{
    Booking, Customer, CustomerUpdate, NewBooking, NewCustomer, NewPayment, NewRateCard, Payment,
    RateCard, RateCardUpdate,
};
use crate::money;

/// Storage operations the engine depends on.
///
/// Implementations report every backend failure as
/// [`EngineError::StorageUnavailable`]. `insert_booking` reports a duplicate
/// invoice number as [`EngineError::InvoiceNumberTaken`] so the caller can
/// regenerate it.
pub trait Store: Send + Sync {
    fn get_customer(&self, id: i64) -> Result<Option<Customer>>;
    fn get_rate_card(&self, id: i64) -> Result<Option<RateCard>>;
    fn insert_booking(&self, record: &NewBooking) -> Result<Booking>;
    fn get_booking(&self, id: i64) -> Result<Option<Booking>>;
    fn list_bookings(&self) -> Result<Vec<Booking>>;
    fn get_booking_by_invoice_number(&self, invoice_number: &str) -> Result<Option<Booking>>;
    fn insert_payment(&self, record: &NewPayment) -> Result<Payment>;
    fn list_payments_for_booking(&self, booking_id: i64) -> Result<Vec<Payment>>;
    fn has_bookings_for_customer(&self, id: i64) -> Result<bool>;
    fn has_bookings_for_rate_card(&self, id: i64) -> Result<bool>;
    /// Returns false when no such customer exists.
    fn delete_customer(&self, id: i64) -> Result<bool>;
    /// Returns false when no such rate card exists.
    fn delete_rate_card(&self, id: i64) -> Result<bool>;
}

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLS: &str = "id, customer_id, hotel_id, check_in_date, check_out_date, room_count, total_price, invoice_number, created_at";
const PAYMENT_COLS: &str =
    "id, booking_id, invoice_number, amount, payment_method, payment_date, created_at";
const CUSTOMER_COLS: &str = "id, name, address, phone, email, created_at";
const HOTEL_COLS: &str =
    "id, name, location, room_type, meal_package, base_price, markup_percentage, created_at";

/// SQLite-backed store. One connection, serialized behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // other processes may hold the write lock while recording payments
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EngineError::StorageUnavailable("connection lock poisoned".into()))
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let v = conn
            .query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(v)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn insert_customer(&self, record: &NewCustomer) -> Result<Customer> {
        record.validate()?;
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO customers(name, address, phone, email) VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.name.trim(),
                    record.address.trim(),
                    record.phone.trim(),
                    record.email.trim()
                ],
            )?;
            conn.last_insert_rowid()
        };
        self.get_customer(id)?
            .ok_or_else(|| EngineError::IntegrityError(format!("customer {} vanished", id)))
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM customers ORDER BY name, id",
            CUSTOMER_COLS
        ))?;
        let rows = stmt.query_map([], customer_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_customer(&self, id: i64, update: &CustomerUpdate) -> Result<Option<Customer>> {
        update.validate()?;
        let changed = {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE customers SET
                    name=COALESCE(?2, name),
                    address=COALESCE(?3, address),
                    phone=COALESCE(?4, phone),
                    email=COALESCE(?5, email)
                 WHERE id=?1",
                params![
                    id,
                    update.name.as_deref().map(str::trim),
                    update.address.as_deref().map(str::trim),
                    update.phone.as_deref().map(str::trim),
                    update.email.as_deref().map(str::trim)
                ],
            )?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_customer(id)
    }

    pub fn insert_rate_card(&self, record: &NewRateCard) -> Result<RateCard> {
        record.validate()?;
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO hotels(name, location, room_type, meal_package, base_price, markup_percentage)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.name.trim(),
                    record.location.trim(),
                    record.room_type.as_str(),
                    record.meal_package.as_str(),
                    record.base_price.to_string(),
                    record.markup_percentage.to_string()
                ],
            )?;
            conn.last_insert_rowid()
        };
        self.get_rate_card(id)?
            .ok_or_else(|| EngineError::IntegrityError(format!("rate card {} vanished", id)))
    }

    pub fn list_rate_cards(&self) -> Result<Vec<RateCard>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM hotels ORDER BY name, id",
            HOTEL_COLS
        ))?;
        let rows = stmt.query_map([], rate_card_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_rate_card(&self, id: i64, update: &RateCardUpdate) -> Result<Option<RateCard>> {
        update.validate()?;
        let changed = {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE hotels SET
                    name=COALESCE(?2, name),
                    location=COALESCE(?3, location),
                    room_type=COALESCE(?4, room_type),
                    meal_package=COALESCE(?5, meal_package),
                    base_price=COALESCE(?6, base_price),
                    markup_percentage=COALESCE(?7, markup_percentage)
                 WHERE id=?1",
                params![
                    id,
                    update.name.as_deref().map(str::trim),
                    update.location.as_deref().map(str::trim),
                    update.room_type.map(|t| t.as_str()),
                    update.meal_package.map(|m| m.as_str()),
                    update.base_price.map(|d| d.to_string()),
                    update.markup_percentage.map(|d| d.to_string())
                ],
            )?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_rate_card(id)
    }

    /// Every payment in the ledger, oldest first.
    pub fn list_payments(&self) -> Result<Vec<Payment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM payments ORDER BY id",
            PAYMENT_COLS
        ))?;
        let rows = stmt.query_map([], payment_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn delete_referenced(&self, sql: &str, id: i64, what: &str) -> Result<bool> {
        let conn = self.conn()?;
        match conn.execute(sql, params![id]) {
            Ok(n) => Ok(n > 0),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Err(EngineError::ReferentialConflict(format!(
                    "{} {} is referenced by existing bookings",
                    what, id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Store for SqliteStore {
    fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let conn = self.conn()?;
        let c = conn
            .query_row(
                &format!("SELECT {} FROM customers WHERE id=?1", CUSTOMER_COLS),
                params![id],
                customer_from_row,
            )
            .optional()?;
        Ok(c)
    }

    fn get_rate_card(&self, id: i64) -> Result<Option<RateCard>> {
        let conn = self.conn()?;
        let h = conn
            .query_row(
                &format!("SELECT {} FROM hotels WHERE id=?1", HOTEL_COLS),
                params![id],
                rate_card_from_row,
            )
            .optional()?;
        Ok(h)
    }

    fn insert_booking(&self, record: &NewBooking) -> Result<Booking> {
        let conn = self.conn()?;
        let res = conn.execute(
            "INSERT INTO bookings(customer_id, hotel_id, check_in_date, check_out_date, room_count, total_price, invoice_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.customer_id,
                record.hotel_id,
                record.check_in_date.to_string(),
                record.check_out_date.to_string(),
                record.room_count,
                record.total_price.to_string(),
                record.invoice_number,
                record.created_at.format(TS_FORMAT).to_string()
            ],
        );
        match res {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return Err(EngineError::InvoiceNumberTaken(
                    record.invoice_number.clone(),
                ));
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                return Err(EngineError::IntegrityError(format!(
                    "booking references missing customer {} or hotel {}",
                    record.customer_id, record.hotel_id
                )));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Booking {
            id: conn.last_insert_rowid(),
            customer_id: record.customer_id,
            hotel_id: record.hotel_id,
            check_in_date: record.check_in_date,
            check_out_date: record.check_out_date,
            room_count: record.room_count,
            total_price: record.total_price,
            invoice_number: record.invoice_number.clone(),
            created_at: truncate_ts(record.created_at),
        })
    }

    fn get_booking(&self, id: i64) -> Result<Option<Booking>> {
        let conn = self.conn()?;
        let b = conn
            .query_row(
                &format!("SELECT {} FROM bookings WHERE id=?1", BOOKING_COLS),
                params![id],
                booking_from_row,
            )
            .optional()?;
        Ok(b)
    }

    fn list_bookings(&self) -> Result<Vec<Booking>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bookings ORDER BY id",
            BOOKING_COLS
        ))?;
        let rows = stmt.query_map([], booking_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_booking_by_invoice_number(&self, invoice_number: &str) -> Result<Option<Booking>> {
        let conn = self.conn()?;
        let b = conn
            .query_row(
                &format!(
                    "SELECT {} FROM bookings WHERE invoice_number=?1",
                    BOOKING_COLS
                ),
                params![invoice_number],
                booking_from_row,
            )
            .optional()?;
        Ok(b)
    }

    /// Appends a payment only if it fits in the booking's remaining balance.
    ///
    /// The balance is re-read inside an IMMEDIATE transaction, so concurrent
    /// writers on the same database file can not jointly overpay.
    fn insert_payment(&self, record: &NewPayment) -> Result<Payment> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let total: Option<String> = tx
            .query_row(
                "SELECT total_price FROM bookings WHERE id=?1",
                params![record.booking_id],
                |r| r.get(0),
            )
            .optional()?;
        let total = match total {
            Some(s) => parse_stored_decimal(&s)?,
            None => return Err(EngineError::BookingNotFound(record.booking_id)),
        };
        let paid = {
            let mut stmt = tx.prepare_cached("SELECT amount FROM payments WHERE booking_id=?1")?;
            let mut rows = stmt.query(params![record.booking_id])?;
            let mut paid = Decimal::ZERO;
            while let Some(r) = rows.next()? {
                let s: String = r.get(0)?;
                paid += parse_stored_decimal(&s)?;
            }
            paid
        };
        money::check_payment(total, paid, record.amount)?;

        tx.execute(
            "INSERT INTO payments(booking_id, invoice_number, amount, payment_method, payment_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.booking_id,
                record.invoice_number,
                record.amount.to_string(),
                record.payment_method.as_str(),
                record.payment_date.to_string(),
                record.created_at.format(TS_FORMAT).to_string()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Payment {
            id,
            booking_id: record.booking_id,
            invoice_number: record.invoice_number.clone(),
            amount: record.amount,
            payment_method: record.payment_method,
            payment_date: record.payment_date,
            created_at: truncate_ts(record.created_at),
        })
    }

    fn list_payments_for_booking(&self, booking_id: i64) -> Result<Vec<Payment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM payments WHERE booking_id=?1 ORDER BY id",
            PAYMENT_COLS
        ))?;
        let rows = stmt.query_map(params![booking_id], payment_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn has_bookings_for_customer(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM bookings WHERE customer_id=?1 LIMIT 1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn has_bookings_for_rate_card(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM bookings WHERE hotel_id=?1 LIMIT 1",
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn delete_customer(&self, id: i64) -> Result<bool> {
        self.delete_referenced("DELETE FROM customers WHERE id=?1", id, "customer")
    }

    fn delete_rate_card(&self, id: i64) -> Result<bool> {
        self.delete_referenced("DELETE FROM hotels WHERE id=?1", id, "hotel")
    }
}

// Stored timestamps have whole-second precision.
fn truncate_ts(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

fn parse_stored_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>().map_err(|e| {
        EngineError::IntegrityError(format!("invalid stored amount '{}': {}", s, e))
    })
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn decimal_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| conversion_error(idx, e))
}

fn parsed_col<T>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let s: String = r.get(idx)?;
    s.parse::<T>().map_err(|e| conversion_error(idx, e))
}

fn customer_from_row(r: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: r.get(0)?,
        name: r.get(1)?,
        address: r.get(2)?,
        phone: r.get(3)?,
        email: r.get(4)?,
        created_at: r.get(5)?,
    })
}

fn rate_card_from_row(r: &Row<'_>) -> rusqlite::Result<RateCard> {
    Ok(RateCard {
        id: r.get(0)?,
        name: r.get(1)?,
        location: r.get(2)?,
        room_type: parsed_col(r, 3)?,
        meal_package: parsed_col(r, 4)?,
        base_price: decimal_col(r, 5)?,
        markup_percentage: decimal_col(r, 6)?,
        created_at: r.get(7)?,
    })
}

fn booking_from_row(r: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: r.get(0)?,
        customer_id: r.get(1)?,
        hotel_id: r.get(2)?,
        check_in_date: r.get(3)?,
        check_out_date: r.get(4)?,
        room_count: r.get(5)?,
        total_price: decimal_col(r, 6)?,
        invoice_number: r.get(7)?,
        created_at: r.get(8)?,
    })
}

fn payment_from_row(r: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: r.get(0)?,
        booking_id: r.get(1)?,
        invoice_number: r.get(2)?,
        amount: decimal_col(r, 3)?,
        payment_method: parsed_col(r, 4)?,
        payment_date: r.get(5)?,
        created_at: r.get(6)?,
    })
}
