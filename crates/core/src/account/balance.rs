//! Balance bound predicates.
//!
//! `reached` predicates are inclusive; `close` predicates flag balances
//! within 10% of the bound so operators get warned before an account
//! actually runs out of (or over) credit.

use rust_decimal::Decimal;

/// Factor used by the proximity predicates (110%).
fn proximity_factor() -> Decimal {
    Decimal::new(11, 1)
}

/// True when the balance is at or below the minimum bound.
#[must_use]
pub fn min_balance_reached(balance: Decimal, min_balance: Decimal) -> bool {
    balance <= min_balance
}

/// True when the balance is at or above the maximum bound.
#[must_use]
pub fn max_balance_reached(balance: Decimal, max_balance: Decimal) -> bool {
    balance >= max_balance
}

/// True when the balance is within 10% of the minimum bound.
#[must_use]
pub fn min_balance_close(balance: Decimal, min_balance: Decimal) -> bool {
    balance <= min_balance * proximity_factor()
}

/// True when the balance is within 10% of the maximum bound.
#[must_use]
pub fn max_balance_close(balance: Decimal, max_balance: Decimal) -> bool {
    balance * proximity_factor() >= max_balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_min_balance_reached_is_inclusive() {
        assert!(min_balance_reached(dec!(10), dec!(10)));
        assert!(min_balance_reached(dec!(9.99), dec!(10)));
        assert!(!min_balance_reached(dec!(10.01), dec!(10)));
    }

    #[test]
    fn test_max_balance_reached_is_inclusive() {
        assert!(max_balance_reached(dec!(100), dec!(100)));
        assert!(max_balance_reached(dec!(100.01), dec!(100)));
        assert!(!max_balance_reached(dec!(99.99), dec!(100)));
    }

    #[test]
    fn test_min_balance_close() {
        assert!(min_balance_close(dec!(11), dec!(10)));
        assert!(!min_balance_close(dec!(11.01), dec!(10)));
    }

    #[test]
    fn test_max_balance_close() {
        assert!(max_balance_close(dec!(91), dec!(100)));
        assert!(!max_balance_close(dec!(90.9), dec!(100)));
    }
}
