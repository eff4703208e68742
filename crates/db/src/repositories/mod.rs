//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Contractor-dependent listings always join explicitly;
//! there are no implicit default scopes.

pub mod account;
pub mod invoice;
pub mod notification;
pub mod stats;

pub use account::{
    AccountError, AccountRepository, AccountTotals, CreateAccountInput, UpdateAccountInput,
};
pub use invoice::{CreateInvoiceInput, InvoiceFilter, InvoiceRepository, InvoiceRepositoryError};
pub use notification::{NotificationRepository, PendingThreshold};
pub use stats::{CustomerAuthStatRow, StatsRepository};
