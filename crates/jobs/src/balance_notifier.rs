//! Balance threshold notifier tick.
//!
//! Each sweep pulls the accounts whose notification setting demands a
//! transition, applies the transition, and alerts the billing contacts.
//! The state change commits first; an email failure is logged and not
//! retried, the next balance crossing simply evaluates fresh.

use std::sync::Arc;
use std::time::Duration;

use switchbill_db::NotificationRepository;
use tracing::{info, warn};

use crate::{scheduler, JobContext};

/// Runs the balance notifier loop.
pub async fn run(ctx: Arc<JobContext>) {
    let period = Duration::from_secs(ctx.config.billing.notification_interval_secs);
    scheduler::run_every("balance_notifier", period, move || {
        let ctx = Arc::clone(&ctx);
        async move { tick(&ctx).await }
    })
    .await;
}

/// One notifier sweep.
///
/// # Errors
///
/// Returns an error when the threshold scan fails; per-account failures
/// are logged and the sweep continues.
pub async fn tick(ctx: &JobContext) -> anyhow::Result<()> {
    let repo = NotificationRepository::new(ctx.db.clone());

    for pending in repo.requiring_notification().await? {
        // The SQL scope and the state machine agree by construction; a
        // row that evaluates to no event was mutated since the scan.
        let Some(event) = pending.event() else {
            continue;
        };

        let applied = repo
            .apply_transition(pending.setting.id, pending.setting.state.into(), event)
            .await?;
        if !applied {
            continue;
        }

        info!(
            account = %pending.account.name,
            balance = %pending.account.balance,
            event = event.describe(),
            "balance threshold transition"
        );

        for recipient in &pending.account.send_invoices_to {
            if let Err(err) = ctx
                .email
                .send_balance_notification(
                    recipient,
                    &pending.account.name,
                    pending.account.balance,
                    event.describe(),
                )
                .await
            {
                warn!(
                    account = %pending.account.name,
                    recipient,
                    error = %err,
                    "failed to send balance notification"
                );
            }
        }
    }

    Ok(())
}
