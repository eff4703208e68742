//! Account validation errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// A single validation failure on an account record.
///
/// Validation collects every failure before rejecting the record, so
/// callers report all of them at once instead of one per round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountValidationError {
    /// The account name must be present.
    #[error("name must be present")]
    NameRequired,

    /// `max_balance` must not be below `min_balance`.
    #[error("max_balance {max_balance} must be greater than or equal to min_balance {min_balance}")]
    BalanceBoundsInverted {
        /// Configured lower bound.
        min_balance: Decimal,
        /// Configured upper bound.
        max_balance: Decimal,
    },

    /// VAT is a percentage and must stay within 0..=100.
    #[error("vat must be between 0 and 100, got {0}")]
    VatOutOfRange(Decimal),

    /// Capacity limits must be strictly positive.
    #[error("{field} must be greater than 0, got {value}")]
    CapacityNotPositive {
        /// Name of the offending capacity column.
        field: &'static str,
        /// The rejected value.
        value: i16,
    },

    /// `max_call_duration` must be strictly positive.
    #[error("max_call_duration must be greater than 0, got {0}")]
    MaxCallDurationNotPositive(i32),

    /// `destination_rate_limit` must not be negative.
    #[error("destination_rate_limit must not be negative, got {0}")]
    RateLimitNegative(Decimal),

    /// The timezone must be a known IANA name.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Invoice reference templates must be present.
    #[error("{0} must be present")]
    RefTemplateRequired(&'static str),
}
