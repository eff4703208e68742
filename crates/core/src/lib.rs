//! Core billing logic for Switchbill.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and predicates live here.
//!
//! # Modules
//!
//! - `account` - Account validation rules and balance predicates
//! - `billing` - Invoice periods and the readiness gate
//! - `invoice` - Invoice states, approval workflow, cover-period predicate
//! - `threshold` - Balance threshold notification state machine

pub mod account;
pub mod billing;
pub mod invoice;
pub mod threshold;
