//! Scheduled billing jobs.
//!
//! Every job is a fixed-interval tick loop spawned by the server binary:
//!
//! - `stats_export` - pushes rolling traffic aggregates to the metrics
//!   collector
//! - `invoice_generation` - turns ready billing cycles into `new` invoices
//! - `balance_notifier` - applies balance threshold transitions and alerts
//!   billing contacts
//! - `invoice_delivery` - drains the approval outbox with bounded retries
//!
//! Jobs are independent; none composes into a pipeline, and a failed tick
//! only logs and waits for the next one.

pub mod balance_notifier;
pub mod invoice_delivery;
pub mod invoice_generation;
pub mod scheduler;
pub mod stats_export;

use sea_orm::DatabaseConnection;
use switchbill_shared::{AppConfig, EmailService};

/// Shared context handed to every job loop.
#[derive(Clone)]
pub struct JobContext {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Application configuration.
    pub config: AppConfig,
    /// SMTP delivery service.
    pub email: EmailService,
    /// HTTP client for the metrics push.
    pub http: reqwest::Client,
}

impl JobContext {
    /// Creates a job context.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let email = EmailService::new(config.email.clone());
        Self {
            db,
            config,
            email,
            http: reqwest::Client::new(),
        }
    }
}
