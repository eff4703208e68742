//! Invoice domain errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::invoice::types::InvoiceState;

/// Errors raised by invoice workflow and validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    /// The requested state transition is not allowed.
    #[error("Invalid invoice transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current state of the invoice.
        from: InvoiceState,
        /// State the caller tried to move to.
        to: InvoiceState,
    },

    /// `start_date` must be strictly before `end_date`.
    #[error("start_date {start_date} must be before end_date {end_date}")]
    StartNotBeforeEnd {
        /// Start of the covered range.
        start_date: DateTime<Utc>,
        /// End of the covered range.
        end_date: DateTime<Utc>,
    },

    /// The invoice amount must not be negative.
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(rust_decimal::Decimal),

    /// A usage counter must not be negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeCounter {
        /// Name of the offending counter column.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
}
