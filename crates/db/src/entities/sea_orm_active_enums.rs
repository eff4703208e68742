//! Postgres enum mappings.
//!
//! The database stores workflow and notification states as native enums;
//! the pure domain enums live in `switchbill-core`. Conversions between
//! the two live here so repositories never compare interpolated strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use switchbill_core::billing::InvoicePeriodKind as CorePeriodKind;
use switchbill_core::invoice::{InvoiceDirection as CoreDirection, InvoiceState as CoreState};
use switchbill_core::threshold::ThresholdState as CoreThresholdState;

/// Invoice workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_state")]
pub enum InvoiceState {
    /// Freshly generated.
    #[sea_orm(string_value = "new")]
    New,
    /// Awaiting approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved (immutable).
    #[sea_orm(string_value = "approved")]
    Approved,
}

impl From<CoreState> for InvoiceState {
    fn from(state: CoreState) -> Self {
        match state {
            CoreState::New => Self::New,
            CoreState::Pending => Self::Pending,
            CoreState::Approved => Self::Approved,
        }
    }
}

impl From<InvoiceState> for CoreState {
    fn from(state: InvoiceState) -> Self {
        match state {
            InvoiceState::New => Self::New,
            InvoiceState::Pending => Self::Pending,
            InvoiceState::Approved => Self::Approved,
        }
    }
}

/// Invoice direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_direction")]
pub enum InvoiceDirection {
    /// Issued to a customer.
    #[sea_orm(string_value = "customer")]
    Customer,
    /// Issued on behalf of a vendor.
    #[sea_orm(string_value = "vendor")]
    Vendor,
}

impl From<CoreDirection> for InvoiceDirection {
    fn from(direction: CoreDirection) -> Self {
        match direction {
            CoreDirection::Customer => Self::Customer,
            CoreDirection::Vendor => Self::Vendor,
        }
    }
}

impl From<InvoiceDirection> for CoreDirection {
    fn from(direction: InvoiceDirection) -> Self {
        match direction {
            InvoiceDirection::Customer => Self::Customer,
            InvoiceDirection::Vendor => Self::Vendor,
        }
    }
}

/// Invoice period cadence configured on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_period_kind")]
pub enum InvoicePeriodKind {
    /// Periods start every Monday.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Periods start every second Monday.
    #[sea_orm(string_value = "biweekly")]
    Biweekly,
    /// Periods start on the 1st of each month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
}

impl From<CorePeriodKind> for InvoicePeriodKind {
    fn from(kind: CorePeriodKind) -> Self {
        match kind {
            CorePeriodKind::Weekly => Self::Weekly,
            CorePeriodKind::Biweekly => Self::Biweekly,
            CorePeriodKind::Monthly => Self::Monthly,
        }
    }
}

impl From<InvoicePeriodKind> for CorePeriodKind {
    fn from(kind: InvoicePeriodKind) -> Self {
        match kind {
            InvoicePeriodKind::Weekly => Self::Weekly,
            InvoicePeriodKind::Biweekly => Self::Biweekly,
            InvoicePeriodKind::Monthly => Self::Monthly,
        }
    }
}

/// Balance threshold notification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "balance_threshold_state")]
pub enum ThresholdState {
    /// No alert is active.
    #[sea_orm(string_value = "none")]
    None,
    /// Low-balance alert fired.
    #[sea_orm(string_value = "low_fired")]
    LowFired,
    /// High-balance alert fired.
    #[sea_orm(string_value = "high_fired")]
    HighFired,
}

impl From<CoreThresholdState> for ThresholdState {
    fn from(state: CoreThresholdState) -> Self {
        match state {
            CoreThresholdState::None => Self::None,
            CoreThresholdState::LowFired => Self::LowFired,
            CoreThresholdState::HighFired => Self::HighFired,
        }
    }
}

impl From<ThresholdState> for CoreThresholdState {
    fn from(state: ThresholdState) -> Self {
        match state {
            ThresholdState::None => Self::None,
            ThresholdState::LowFired => Self::LowFired,
            ThresholdState::HighFired => Self::HighFired,
        }
    }
}

/// Delivery state of a queued invoice notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "delivery_state")]
pub enum DeliveryState {
    /// Waiting for the delivery job.
    #[sea_orm(string_value = "queued")]
    Queued,
    /// Sent successfully.
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Exhausted its delivery attempts.
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_state_round_trip() {
        for state in [CoreState::New, CoreState::Pending, CoreState::Approved] {
            assert_eq!(CoreState::from(InvoiceState::from(state)), state);
        }
    }

    #[test]
    fn test_threshold_state_round_trip() {
        for state in [
            CoreThresholdState::None,
            CoreThresholdState::LowFired,
            CoreThresholdState::HighFired,
        ] {
            assert_eq!(CoreThresholdState::from(ThresholdState::from(state)), state);
        }
    }

    #[test]
    fn test_period_kind_round_trip() {
        for kind in [
            CorePeriodKind::Weekly,
            CorePeriodKind::Biweekly,
            CorePeriodKind::Monthly,
        ] {
            assert_eq!(CorePeriodKind::from(InvoicePeriodKind::from(kind)), kind);
        }
    }
}
