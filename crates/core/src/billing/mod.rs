//! Billing cycle primitives: invoice periods and the readiness gate.

pub mod period;
pub mod readiness;

pub use period::{local_date, local_midnight_utc, InvoicePeriodKind};
pub use readiness::{effective_grace, ready_for_invoice};
