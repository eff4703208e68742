//! Invoice domain: states, approval workflow, cover-period predicate,
//! validation, and reference rendering.

pub mod cover;
pub mod error;
pub mod reference;
pub mod types;
pub mod validation;
pub mod workflow;

pub use cover::covers_window;
pub use error::InvoiceError;
pub use types::{InvoiceDirection, InvoiceState, InvoiceTotals};
pub use workflow::{InvoiceAction, InvoiceWorkflow};
