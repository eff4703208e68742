//! Switchbill billing daemon
//!
//! Main entry point for the Switchbill backend service: connects to the
//! database and runs the scheduled billing jobs until interrupted.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use switchbill_db::connect;
use switchbill_jobs::{balance_notifier, invoice_delivery, invoice_generation, stats_export, JobContext};
use switchbill_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchbill=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create shared job context
    let ctx = Arc::new(JobContext::new(db, config));
    info!(
        collector = %ctx.config.metrics.collector_url,
        export_interval_secs = ctx.config.metrics.export_interval_secs,
        generation_interval_secs = ctx.config.billing.generation_interval_secs,
        "Starting billing jobs"
    );

    // Spawn the job loops
    tokio::spawn(stats_export::run(Arc::clone(&ctx)));
    tokio::spawn(invoice_generation::run(Arc::clone(&ctx)));
    tokio::spawn(balance_notifier::run(Arc::clone(&ctx)));
    tokio::spawn(invoice_delivery::run(Arc::clone(&ctx)));

    // Run until interrupted
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
