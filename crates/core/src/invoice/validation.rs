//! Invoice validation rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::invoice::error::InvoiceError;

/// Validates that the covered range is well-formed.
///
/// # Errors
///
/// Returns `InvoiceError::StartNotBeforeEnd` when `start_date >= end_date`
/// (equal or inverted dates are both rejected).
pub fn validate_dates(
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<(), InvoiceError> {
    if start_date >= end_date {
        return Err(InvoiceError::StartNotBeforeEnd {
            start_date,
            end_date,
        });
    }
    Ok(())
}

/// Validates aggregated totals.
///
/// # Errors
///
/// Returns an error when the amount or any usage counter is negative.
pub fn validate_totals(
    amount: Decimal,
    calls_count: i64,
    calls_duration: i64,
    billing_duration: i64,
) -> Result<(), InvoiceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(InvoiceError::NegativeAmount(amount));
    }
    for (field, value) in [
        ("calls_count", calls_count),
        ("calls_duration", calls_duration),
        ("billing_duration", billing_duration),
    ] {
        if value < 0 {
            return Err(InvoiceError::NegativeCounter { field, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_ordered_dates_accepted() {
        assert!(validate_dates(at(1), at(2)).is_ok());
    }

    #[test]
    fn test_equal_dates_rejected() {
        assert!(matches!(
            validate_dates(at(1), at(1)),
            Err(InvoiceError::StartNotBeforeEnd { .. })
        ));
    }

    #[test]
    fn test_inverted_dates_rejected() {
        assert!(matches!(
            validate_dates(at(2), at(1)),
            Err(InvoiceError::StartNotBeforeEnd { .. })
        ));
    }

    #[test]
    fn test_totals_accept_zero() {
        assert!(validate_totals(dec!(0), 0, 0, 0).is_ok());
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert_eq!(
            validate_totals(dec!(-0.01), 0, 0, 0),
            Err(InvoiceError::NegativeAmount(dec!(-0.01)))
        );
    }

    #[test]
    fn test_negative_counter_rejected() {
        assert_eq!(
            validate_totals(dec!(1), 1, -5, 1),
            Err(InvoiceError::NegativeCounter {
                field: "calls_duration",
                value: -5,
            })
        );
    }
}
