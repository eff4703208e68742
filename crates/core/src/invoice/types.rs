//! Invoice domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice state in the approval workflow.
///
/// Invoices progress `New -> Pending -> Approved`; approval is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    /// Freshly generated, totals not yet reviewed.
    New,
    /// Assigned for review, awaiting approval.
    Pending,
    /// Approved and dispatched to the customer (immutable).
    Approved,
}

impl InvoiceState {
    /// Parse a state from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }

    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }

    /// Returns true if the invoice can be approved from this state.
    #[must_use]
    pub fn is_approvable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the invoice is immutable.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Direction of an invoice relative to the platform operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceDirection {
    /// Issued to a customer for originated traffic.
    Customer,
    /// Issued on behalf of a vendor for terminated traffic.
    Vendor,
}

impl InvoiceDirection {
    /// Parse a direction from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "vendor" => Some(Self::Vendor),
            _ => None,
        }
    }

    /// Returns the string representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
        }
    }
}

/// Aggregated totals over a set of invoices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of invoice amounts.
    pub total_amount: Decimal,
    /// Sum of call counts.
    pub total_calls_count: i64,
    /// Sum of call durations, in seconds.
    pub total_calls_duration: i64,
    /// Sum of billed durations, in seconds.
    pub total_billing_duration: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip_through_str() {
        for state in [
            InvoiceState::New,
            InvoiceState::Pending,
            InvoiceState::Approved,
        ] {
            assert_eq!(InvoiceState::parse(state.as_str()), Some(state));
        }
        assert_eq!(InvoiceState::parse("draft"), None);
    }

    #[test]
    fn test_only_pending_is_approvable() {
        assert!(!InvoiceState::New.is_approvable());
        assert!(InvoiceState::Pending.is_approvable());
        assert!(!InvoiceState::Approved.is_approvable());
    }

    #[test]
    fn test_approved_is_immutable() {
        assert!(!InvoiceState::New.is_immutable());
        assert!(!InvoiceState::Pending.is_immutable());
        assert!(InvoiceState::Approved.is_immutable());
    }

    #[test]
    fn test_direction_round_trip_through_str() {
        for direction in [InvoiceDirection::Customer, InvoiceDirection::Vendor] {
            assert_eq!(InvoiceDirection::parse(direction.as_str()), Some(direction));
        }
        assert_eq!(InvoiceDirection::parse("transit"), None);
    }
}
