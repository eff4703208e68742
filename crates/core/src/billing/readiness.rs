//! Invoice readiness gate.
//!
//! An account becomes ready for invoicing once its scheduled
//! `next_*_invoice_at` plus a grace period has passed. The grace period is
//! the account's maximum call duration, so that calls still in flight at
//! the boundary are billed into the closing period rather than lost.

use chrono::{DateTime, Duration, Utc};

/// Resolves the grace period for an account.
///
/// Accounts may override the configured default with their own
/// `max_call_duration`.
#[must_use]
pub fn effective_grace(max_call_duration: Option<i64>, default_secs: i64) -> i64 {
    max_call_duration.unwrap_or(default_secs)
}

/// True when `next_invoice_at + grace_secs <= now`.
///
/// Applies independently to the customer and vendor cycles; the caller
/// picks which timestamp to pass.
#[must_use]
pub fn ready_for_invoice(
    next_invoice_at: DateTime<Utc>,
    grace_secs: i64,
    now: DateTime<Utc>,
) -> bool {
    next_invoice_at + Duration::seconds(grace_secs) <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_elapsed_schedule_with_short_grace_is_ready() {
        let next_at = now() - Duration::seconds(10);
        assert!(ready_for_invoice(next_at, 5, now()));
    }

    #[test]
    fn test_elapsed_schedule_with_long_grace_is_not_ready() {
        let next_at = now() - Duration::seconds(10);
        assert!(!ready_for_invoice(next_at, 20, now()));
    }

    #[test]
    fn test_exact_boundary_is_ready() {
        let next_at = now() - Duration::seconds(10);
        assert!(ready_for_invoice(next_at, 10, now()));
    }

    #[test]
    fn test_future_schedule_is_not_ready() {
        let next_at = now() + Duration::seconds(1);
        assert!(!ready_for_invoice(next_at, 0, now()));
    }

    #[test]
    fn test_effective_grace_prefers_account_override() {
        assert_eq!(effective_grace(Some(600), 7200), 600);
        assert_eq!(effective_grace(None, 7200), 7200);
    }
}
