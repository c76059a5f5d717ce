//! The module contains the errors the engine can return.
//!
//! Sharing validation failures are typed so callers can build user-facing
//! messages without parsing strings:
//!
//! - [`DuplicateOwner`] and [`UnknownOwner`] carry the offending owner id.
//! - [`AmountMismatch`] carries the computed and the expected sum.
//!
//!  [`DuplicateOwner`]: EngineError::DuplicateOwner
//!  [`UnknownOwner`]: EngineError::UnknownOwner
//!  [`AmountMismatch`]: EngineError::AmountMismatch
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
///
/// Every variant except [`EngineError::Database`] is a recoverable
/// validation outcome; the engine never panics on expected bad input.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("shared_with field is missing or malformed: {0}")]
    MalformedSharing(String),
    #[error("{0}")]
    FieldPresenceViolation(String),
    #[error("shared_with ids must be unique: owner {0} appears more than once")]
    DuplicateOwner(i64),
    #[error("owner {0} is not associated with the specified account")]
    UnknownOwner(i64),
    #[error("account \"{0}\" not found")]
    AccountNotFound(String),
    #[error("sum of amounts ({computed}) must be equal to total amount ({expected})")]
    AmountMismatch { computed: i64, expected: i64 },
    #[error("invalid weight: {0}")]
    InvalidWeight(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MalformedSharing(a), Self::MalformedSharing(b)) => a == b,
            (Self::FieldPresenceViolation(a), Self::FieldPresenceViolation(b)) => a == b,
            (Self::DuplicateOwner(a), Self::DuplicateOwner(b)) => a == b,
            (Self::UnknownOwner(a), Self::UnknownOwner(b)) => a == b,
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (
                Self::AmountMismatch {
                    computed: a,
                    expected: b,
                },
                Self::AmountMismatch {
                    computed: c,
                    expected: d,
                },
            ) => a == c && b == d,
            (Self::InvalidWeight(a), Self::InvalidWeight(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
