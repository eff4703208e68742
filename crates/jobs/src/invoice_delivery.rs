//! Invoice delivery tick.
//!
//! Approval queues a notification row; this job drains the queue,
//! sending the approved-invoice email at least once. Attempts are
//! bounded: a notification that keeps failing flips to `failed` and
//! surfaces in the logs instead of blocking the queue.

use std::sync::Arc;
use std::time::Duration;

use switchbill_db::NotificationRepository;
use tracing::{error, info, warn};

use crate::{scheduler, JobContext};

/// Runs the invoice delivery loop.
pub async fn run(ctx: Arc<JobContext>) {
    let period = Duration::from_secs(ctx.config.billing.delivery_interval_secs);
    scheduler::run_every("invoice_delivery", period, move || {
        let ctx = Arc::clone(&ctx);
        async move { tick(&ctx).await }
    })
    .await;
}

/// One delivery sweep.
///
/// # Errors
///
/// Returns an error when the queue query fails; per-notification failures
/// are recorded on the row and retried next sweep.
pub async fn tick(ctx: &JobContext) -> anyhow::Result<()> {
    let repo = NotificationRepository::new(ctx.db.clone());
    let max_attempts = ctx.config.billing.max_delivery_attempts;

    for (notification, invoice) in repo.queued_notifications().await? {
        let reference = invoice
            .reference
            .clone()
            .unwrap_or_else(|| invoice.uuid.to_string());
        let start_date = invoice.start_date.date_naive().to_string();
        let end_date = invoice.end_date.date_naive().to_string();

        let mut failure: Option<String> = None;
        for recipient in notification.recipients.split(',') {
            let recipient = recipient.trim();
            if recipient.is_empty() {
                continue;
            }
            if let Err(err) = ctx
                .email
                .send_invoice_notification(
                    recipient,
                    &reference,
                    invoice.amount,
                    &start_date,
                    &end_date,
                )
                .await
            {
                warn!(
                    invoice = %invoice.uuid,
                    recipient,
                    error = %err,
                    "invoice notification delivery failed"
                );
                failure = Some(err.to_string());
            }
        }

        match failure {
            None => {
                repo.mark_delivered(notification.id).await?;
                info!(invoice = %invoice.uuid, "invoice notification delivered");
            }
            Some(message) => {
                repo.record_failure(notification.id, &message, max_attempts)
                    .await?;
                if notification.attempts + 1 >= max_attempts {
                    error!(
                        invoice = %invoice.uuid,
                        attempts = notification.attempts + 1,
                        "invoice notification gave up after repeated failures"
                    );
                }
            }
        }
    }

    Ok(())
}
