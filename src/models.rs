// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{EngineError, Result};
use crate::money::is_minor_unit_exact;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidCustomer(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_email(value: &str) -> Result<()> {
    require_text("email", value)?;
    let v = value.trim();
    match v.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(EngineError::InvalidCustomer(format!(
            "'{}' is not an email address",
            v
        ))),
    }
}

impl NewCustomer {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("address", &self.address)?;
        require_text("phone", &self.phone)?;
        require_email(&self.email)
    }
}

impl CustomerUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(v) = &self.name {
            require_text("name", v)?;
        }
        if let Some(v) = &self.address {
            require_text("address", v)?;
        }
        if let Some(v) = &self.phone {
            require_text("phone", v)?;
        }
        if let Some(v) = &self.email {
            require_email(v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Double,
    Triple,
    Quad,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Double => "double",
            RoomType::Triple => "triple",
            RoomType::Quad => "quad",
        }
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "double" => Ok(RoomType::Double),
            "triple" => Ok(RoomType::Triple),
            "quad" => Ok(RoomType::Quad),
            other => Err(format!(
                "unknown room type '{}' (use double|triple|quad)",
                other
            )),
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealPackage {
    Fullboard,
    Halfboard,
}

impl MealPackage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealPackage::Fullboard => "fullboard",
            MealPackage::Halfboard => "halfboard",
        }
    }
}

impl FromStr for MealPackage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fullboard" => Ok(MealPackage::Fullboard),
            "halfboard" => Ok(MealPackage::Halfboard),
            other => Err(format!(
                "unknown meal package '{}' (use fullboard|halfboard)",
                other
            )),
        }
    }
}

impl fmt::Display for MealPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hotel's priceable unit: room type, meal package, base price and markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub room_type: RoomType,
    pub meal_package: MealPackage,
    pub base_price: Decimal,
    pub markup_percentage: Decimal,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRateCard {
    pub name: String,
    pub location: String,
    pub room_type: RoomType,
    pub meal_package: MealPackage,
    pub base_price: Decimal,
    pub markup_percentage: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct RateCardUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub room_type: Option<RoomType>,
    pub meal_package: Option<MealPackage>,
    pub base_price: Option<Decimal>,
    pub markup_percentage: Option<Decimal>,
}

fn check_rate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidRateCard(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Largest accepted base price per room-night.
pub const MAX_BASE_PRICE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);
/// Largest accepted markup, in percent.
pub const MAX_MARKUP_PERCENTAGE: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

fn check_base_price(d: Decimal) -> Result<()> {
    if d <= Decimal::ZERO || d > MAX_BASE_PRICE || !is_minor_unit_exact(d) {
        return Err(EngineError::InvalidRateCard(format!(
            "base price {} must be positive, at most {} and have at most 2 decimal places",
            d, MAX_BASE_PRICE
        )));
    }
    Ok(())
}

fn check_markup(d: Decimal) -> Result<()> {
    if d < Decimal::ZERO || d > MAX_MARKUP_PERCENTAGE || !is_minor_unit_exact(d) {
        return Err(EngineError::InvalidRateCard(format!(
            "markup {}% must be between 0 and {} with at most 2 decimal places",
            d, MAX_MARKUP_PERCENTAGE
        )));
    }
    Ok(())
}

impl NewRateCard {
    pub fn validate(&self) -> Result<()> {
        check_rate_text("name", &self.name)?;
        check_rate_text("location", &self.location)?;
        check_base_price(self.base_price)?;
        check_markup(self.markup_percentage)
    }
}

impl RateCardUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(v) = &self.name {
            check_rate_text("name", v)?;
        }
        if let Some(v) = &self.location {
            check_rate_text("location", v)?;
        }
        if let Some(d) = self.base_price {
            check_base_price(d)?;
        }
        if let Some(d) = self.markup_percentage {
            check_markup(d)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub hotel_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub room_count: u32,
    pub total_price: Decimal,
    pub invoice_number: String,
    pub created_at: NaiveDateTime,
}

/// A fully priced booking that has not been assigned a row id yet.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: i64,
    pub hotel_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub room_count: u32,
    pub total_price: Decimal,
    pub invoice_number: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Online => "online",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "online" => Ok(PaymentMethod::Online),
            other => Err(format!(
                "unknown payment method '{}' (use cash|card|bank_transfer|online)",
                other
            )),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub invoice_number: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: i64,
    pub invoice_number: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// Pricing breakdown for a stay. Money fields are rounded to the minor unit,
/// each from the unrounded intermediate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub nights: u32,
    pub base_price_per_night: Decimal,
    pub selling_price_per_night: Decimal,
    pub total_base_cost: Decimal,
    pub total_selling_price: Decimal,
}

/// Read-only preview of a booking before it is committed.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSummary {
    pub customer: Customer,
    pub hotel: RateCard,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub room_count: u32,
    pub nights: u32,
    pub base_price_per_night: Decimal,
    pub selling_price_per_night: Decimal,
    pub total_base_cost: Decimal,
    pub total_selling_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    pub booking: Booking,
    pub customer: Customer,
    pub hotel: RateCard,
    pub payments: Vec<Payment>,
    pub total_paid: Decimal,
    pub outstanding_balance: Decimal,
}

impl InvoiceDetail {
    pub fn is_settled(&self) -> bool {
        self.outstanding_balance.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitLossRow {
    pub invoice_number: String,
    pub customer_name: String,
    pub hotel_name: String,
    pub base_cost: Decimal,
    pub selling_price: Decimal,
    pub profit: Decimal,
    pub booking_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub year: i32,
    pub month: u32,
    pub booking_count: u64,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutstandingRow {
    pub invoice_number: String,
    pub customer_name: String,
    pub hotel_name: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub booking_date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MonthlyFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}
