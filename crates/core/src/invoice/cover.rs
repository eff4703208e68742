//! Cover-period overlap predicate.
//!
//! Invoices cover a half-open range `[start_date, end_date)`. Before
//! generating an invoice for a candidate window the generator checks
//! whether an existing invoice already covers any part of it; windows that
//! merely touch at a boundary do not overlap.

use chrono::{DateTime, Utc};

/// True when the invoice range `[inv_start, inv_end)` overlaps the
/// candidate window `[window_start, window_end)`.
#[must_use]
pub fn covers_window(
    inv_start: DateTime<Utc>,
    inv_end: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> bool {
    (inv_start < window_start && inv_end > window_start)
        || (inv_start >= window_start && inv_start < window_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[rstest]
    // invoice [Jan 1, Feb 1) vs candidate [Jan 15, Feb 15): overlap
    #[case(at(2026, 1, 1), at(2026, 2, 1), at(2026, 1, 15), at(2026, 2, 15), true)]
    // invoice [Jan 1, Feb 1) vs candidate [Feb 1, Mar 1): exactly adjacent
    #[case(at(2026, 1, 1), at(2026, 2, 1), at(2026, 2, 1), at(2026, 3, 1), false)]
    // candidate entirely inside the invoice
    #[case(at(2026, 1, 1), at(2026, 2, 1), at(2026, 1, 10), at(2026, 1, 20), true)]
    // invoice entirely inside the candidate
    #[case(at(2026, 1, 10), at(2026, 1, 20), at(2026, 1, 1), at(2026, 2, 1), true)]
    // invoice entirely before the candidate
    #[case(at(2025, 12, 1), at(2026, 1, 1), at(2026, 1, 15), at(2026, 2, 15), false)]
    // invoice entirely after the candidate
    #[case(at(2026, 3, 1), at(2026, 4, 1), at(2026, 1, 15), at(2026, 2, 15), false)]
    // identical windows
    #[case(at(2026, 1, 1), at(2026, 2, 1), at(2026, 1, 1), at(2026, 2, 1), true)]
    fn test_covers_window(
        #[case] inv_start: DateTime<Utc>,
        #[case] inv_end: DateTime<Utc>,
        #[case] window_start: DateTime<Utc>,
        #[case] window_end: DateTime<Utc>,
        #[case] expected: bool,
    ) {
        assert_eq!(
            covers_window(inv_start, inv_end, window_start, window_end),
            expected
        );
    }
}
