//! Account domain: validation rules and balance predicates.

pub mod balance;
pub mod error;
pub mod validation;

pub use balance::{
    max_balance_close, max_balance_reached, min_balance_close, min_balance_reached,
};
pub use error::AccountValidationError;
pub use validation::{validate, AccountAttributes};
