//! Invoice period cadence.
//!
//! Period boundaries are local-calendar concepts: a monthly invoice for an
//! account in `Europe/Kyiv` starts at local midnight on the 1st, not at UTC
//! midnight. Boundary math therefore happens on `NaiveDate` in the
//! account's timezone; the helpers at the bottom convert between local
//! dates and the UTC instants stored in the database.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Anchor Monday for biweekly alignment (2001-01-01 was a Monday).
const BIWEEKLY_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2001, 1, 1) {
    Some(date) => date,
    None => panic!("biweekly epoch is a valid date"),
};

/// Recurrence rule governing when new invoices are due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoicePeriodKind {
    /// Periods start every Monday.
    Weekly,
    /// Periods start every second Monday, anchored to a fixed epoch.
    Biweekly,
    /// Periods start on the 1st of each month.
    Monthly,
}

impl InvoicePeriodKind {
    /// Parse a period kind from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Returns the string representation of the period kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Start of the period covering `reference`.
    ///
    /// Idempotent: `initial_date(initial_date(d)) == initial_date(d)`.
    #[must_use]
    pub fn initial_date(&self, reference: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => monday_on_or_before(reference),
            Self::Biweekly => {
                let days = (reference - BIWEEKLY_EPOCH).num_days();
                BIWEEKLY_EPOCH + Duration::days(days.div_euclid(14) * 14)
            }
            Self::Monthly => reference
                .with_day(1)
                .unwrap_or(reference),
        }
    }

    /// Start of the period following the one covering `reference`.
    #[must_use]
    pub fn next_date(&self, reference: NaiveDate) -> NaiveDate {
        let start = self.initial_date(reference);
        match self {
            Self::Weekly => start + Duration::days(7),
            Self::Biweekly => start + Duration::days(14),
            Self::Monthly => {
                let (year, month) = if start.month() == 12 {
                    (start.year() + 1, 1)
                } else {
                    (start.year(), start.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(start)
            }
        }
    }
}

fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - Duration::days(i64::from(offset))
}

/// The local calendar date of a UTC instant in the given timezone.
#[must_use]
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// The UTC instant of local midnight on `date` in the given timezone.
///
/// On a DST gap (midnight does not exist locally) the earliest valid
/// local time is used; an ambiguous midnight resolves to its earlier
/// occurrence.
#[must_use]
pub fn local_midnight_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at.with_timezone(&Utc),
        LocalResult::None => {
            // Midnight fell into a DST gap; scan forward to the first
            // representable local minute.
            let mut probe = midnight;
            loop {
                probe = probe + Duration::minutes(15);
                match tz.from_local_datetime(&probe) {
                    LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => {
                        return at.with_timezone(&Utc);
                    }
                    LocalResult::None => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2026, 8, 7), date(2026, 8, 3))] // Friday -> preceding Monday
    #[case(date(2026, 8, 3), date(2026, 8, 3))] // Monday is its own start
    #[case(date(2026, 8, 9), date(2026, 8, 3))] // Sunday -> preceding Monday
    fn test_weekly_initial_date(#[case] reference: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(InvoicePeriodKind::Weekly.initial_date(reference), expected);
    }

    #[rstest]
    #[case(date(2026, 8, 7), date(2026, 8, 1))]
    #[case(date(2026, 8, 1), date(2026, 8, 1))]
    #[case(date(2026, 12, 31), date(2026, 12, 1))]
    fn test_monthly_initial_date(#[case] reference: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(InvoicePeriodKind::Monthly.initial_date(reference), expected);
    }

    #[test]
    fn test_monthly_next_date_rolls_over_year() {
        assert_eq!(
            InvoicePeriodKind::Monthly.next_date(date(2026, 12, 15)),
            date(2027, 1, 1)
        );
    }

    #[test]
    fn test_weekly_next_date() {
        assert_eq!(
            InvoicePeriodKind::Weekly.next_date(date(2026, 8, 7)),
            date(2026, 8, 10)
        );
    }

    #[test]
    fn test_biweekly_initial_date_is_monday_and_idempotent() {
        for offset in 0..60 {
            let reference = date(2026, 1, 1) + Duration::days(offset);
            let start = InvoicePeriodKind::Biweekly.initial_date(reference);
            assert_eq!(start.weekday(), Weekday::Mon);
            assert!(start <= reference);
            assert_eq!(InvoicePeriodKind::Biweekly.initial_date(start), start);
            assert!(reference - start < Duration::days(14));
        }
    }

    #[test]
    fn test_biweekly_period_length() {
        let start = InvoicePeriodKind::Biweekly.initial_date(date(2026, 8, 7));
        assert_eq!(
            InvoicePeriodKind::Biweekly.next_date(start),
            start + Duration::days(14)
        );
    }

    #[test]
    fn test_kind_round_trip_through_str() {
        for kind in [
            InvoicePeriodKind::Weekly,
            InvoicePeriodKind::Biweekly,
            InvoicePeriodKind::Monthly,
        ] {
            assert_eq!(InvoicePeriodKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(InvoicePeriodKind::parse("quarterly"), None);
    }

    #[test]
    fn test_local_midnight_utc_offset() {
        let tz: Tz = "Europe/Kyiv".parse().unwrap();
        let at = local_midnight_utc(date(2026, 1, 1), tz);
        // Kyiv is UTC+2 in winter: local midnight is 22:00 UTC the day before.
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 12, 31, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_local_date_crosses_day_boundary() {
        let tz: Tz = "Europe/Kyiv".parse().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 31, 23, 0, 0).unwrap();
        // 23:00 UTC is already April 1st in Kyiv (UTC+3 in summer).
        assert_eq!(local_date(at, tz), date(2026, 4, 1));
    }

    #[test]
    fn test_local_midnight_survives_dst_gap() {
        // America/Sao_Paulo historically skipped midnight on DST start.
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        let at = local_midnight_utc(date(2017, 10, 15), tz);
        // Must not hang or panic; result is the first valid local instant.
        assert!(at > Utc.with_ymd_and_hms(2017, 10, 14, 0, 0, 0).unwrap());
    }
}
