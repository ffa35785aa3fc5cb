// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse classification callers use to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    ReferentialConflict,
    StorageUnavailable,
    Integrity,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("customer {0} not found")]
    CustomerNotFound(i64),

    #[error("hotel rate card {0} not found")]
    RateCardNotFound(i64),

    #[error("booking {0} not found")]
    BookingNotFound(i64),

    #[error("invalid date range: check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("invalid room count: {0} (must be at least 1)")]
    InvalidRoomCount(i64),

    #[error("invalid payment amount: {0} (must be positive with at most 2 decimal places)")]
    InvalidAmount(Decimal),

    #[error("overpayment rejected: outstanding {outstanding}, requested {requested}")]
    OverpaymentRejected {
        outstanding: Decimal,
        requested: Decimal,
    },

    #[error("invalid report filter: {0}")]
    InvalidReportFilter(String),

    #[error("invalid rate card: {0}")]
    InvalidRateCard(String),

    #[error("invalid customer: {0}")]
    InvalidCustomer(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("cannot delete: {0}")]
    ReferentialConflict(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("invoice number already taken: {0}")]
    InvoiceNumberTaken(String),

    #[error("integrity error: {0}")]
    IntegrityError(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::CustomerNotFound(_)
            | EngineError::RateCardNotFound(_)
            | EngineError::BookingNotFound(_) => ErrorKind::NotFound,
            EngineError::InvalidDateRange { .. }
            | EngineError::InvalidRoomCount(_)
            | EngineError::InvalidAmount(_)
            | EngineError::OverpaymentRejected { .. }
            | EngineError::InvalidReportFilter(_)
            | EngineError::InvalidRateCard(_)
            | EngineError::InvalidCustomer(_)
            | EngineError::InvalidSetting(_) => ErrorKind::Validation,
            EngineError::ReferentialConflict(_) => ErrorKind::ReferentialConflict,
            EngineError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            // a taken invoice number only escapes the factory once retries are exhausted
            EngineError::InvoiceNumberTaken(_) | EngineError::IntegrityError(_) => {
                ErrorKind::Integrity
            }
        }
    }

    /// Only transient storage failures are worth retrying, and only by the caller.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StorageUnavailable
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            // the row is there but its contents are not what we wrote
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => {
                EngineError::IntegrityError(err.to_string())
            }
            _ => EngineError::StorageUnavailable(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_column_is_integrity_not_retryable() {
        let err: EngineError =
            rusqlite::Error::InvalidColumnType(3, "total_price".into(), rusqlite::types::Type::Blob)
                .into();
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert!(!err.is_retryable());

        let err: EngineError = rusqlite::Error::IntegralValueOutOfRange(5, -1).into();
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn busy_database_is_retryable() {
        let err: EngineError = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        )
        .into();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        assert!(err.is_retryable());
    }
}
