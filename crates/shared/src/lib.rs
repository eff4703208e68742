//! Shared types, errors, and configuration for Switchbill.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - SMTP email delivery

pub mod config;
pub mod email;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
