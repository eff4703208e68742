//! Invoice generation tick.
//!
//! Each sweep finds accounts whose billing cycle boundary (plus grace) has
//! passed, computes the window the new invoice must cover, skips windows an
//! existing invoice already covers, and creates the invoice while advancing
//! the account's schedule in one transaction.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use chrono_tz::Tz;
use switchbill_core::billing::{
    effective_grace, local_date, local_midnight_utc, ready_for_invoice, InvoicePeriodKind,
};
use switchbill_core::invoice::{covers_window, InvoiceDirection};
use switchbill_db::entities::accounts;
use switchbill_db::repositories::invoice::CreateInvoiceInput;
use switchbill_db::{AccountRepository, InvoiceRepository};
use tracing::{debug, info, warn};

use crate::{scheduler, JobContext};

/// Runs the invoice generation loop.
pub async fn run(ctx: Arc<JobContext>) {
    let period = Duration::from_secs(ctx.config.billing.generation_interval_secs);
    scheduler::run_every("invoice_generation", period, move || {
        let ctx = Arc::clone(&ctx);
        async move { tick(&ctx).await }
    })
    .await;
}

/// One generation sweep over both directions.
///
/// # Errors
///
/// Returns an error when the readiness scan fails; per-account failures
/// are logged and the sweep continues.
pub async fn tick(ctx: &JobContext) -> anyhow::Result<()> {
    let accounts_repo = AccountRepository::new(ctx.db.clone());
    let invoices_repo = InvoiceRepository::new(ctx.db.clone());
    let grace = ctx.config.billing.max_call_duration;
    let now = Utc::now();

    for direction in [InvoiceDirection::Customer, InvoiceDirection::Vendor] {
        let ready = match direction {
            InvoiceDirection::Customer => {
                accounts_repo.ready_for_customer_invoice(grace, now).await?
            }
            InvoiceDirection::Vendor => {
                accounts_repo.ready_for_vendor_invoice(grace, now).await?
            }
        };
        debug!(direction = direction.as_str(), ready = ready.len(), "generation sweep");

        for account in ready {
            if let Err(err) =
                generate_for_account(&invoices_repo, &account, direction, grace, now).await
            {
                warn!(
                    account = %account.name,
                    direction = direction.as_str(),
                    error = %err,
                    "invoice generation failed"
                );
            }
        }
    }

    Ok(())
}

/// Generates one invoice for an account and direction, advancing the
/// schedule.
async fn generate_for_account(
    invoices_repo: &InvoiceRepository,
    account: &accounts::Model,
    direction: InvoiceDirection,
    default_grace_secs: i64,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let (period, next_at) = cycle_config(account, direction);
    let (Some(period), Some(next_at)) = (period, next_at) else {
        // The readiness query requires both; a concurrent update can
        // still clear them between the scan and this point.
        warn!(account = %account.name, "billing cycle no longer configured, skipping");
        return Ok(());
    };

    // Re-derive readiness from the pure gate so the SQL scan and the
    // domain predicate cannot drift apart silently.
    let grace = effective_grace(account.max_call_duration.map(i64::from), default_grace_secs);
    if !ready_for_invoice(next_at, grace, now) {
        debug!(account = %account.name, "account no longer ready, skipping");
        return Ok(());
    }

    let tz: Tz = account
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("account {} has invalid timezone", account.name))?;

    let window_end = next_at;
    let window_start = match invoices_repo.latest_end_date(account.id, direction).await? {
        Some(end_date) => end_date,
        None => first_window_start(period, window_end, tz),
    };

    let next_boundary = advance_schedule_to(period, window_end, tz);

    if window_start >= window_end {
        // The latest invoice already covers the scheduled boundary;
        // advance so the account does not re-trigger every sweep.
        warn!(
            account = %account.name,
            direction = direction.as_str(),
            "window already covered by a later invoice, advancing schedule"
        );
        invoices_repo
            .advance_schedule(account.id, direction, next_boundary)
            .await?;
        return Ok(());
    }

    let covering = invoices_repo
        .covering(account.id, direction, window_start, window_end)
        .await?;
    let covered = covering.iter().any(|invoice| {
        covers_window(
            invoice.start_date.with_timezone(&Utc),
            invoice.end_date.with_timezone(&Utc),
            window_start,
            window_end,
        )
    });
    if covered {
        warn!(
            account = %account.name,
            direction = direction.as_str(),
            covered_by = covering.len(),
            "window already covered, advancing schedule without invoicing"
        );
        invoices_repo
            .advance_schedule(account.id, direction, next_boundary)
            .await?;
        return Ok(());
    }

    let invoice = invoices_repo
        .create_invoice_and_advance(
            CreateInvoiceInput::empty(account.id, direction, window_start, window_end),
            next_boundary,
        )
        .await?;
    info!(
        account = %account.name,
        direction = direction.as_str(),
        invoice = %invoice.uuid,
        start = %window_start,
        end = %window_end,
        "invoice generated"
    );

    Ok(())
}

fn cycle_config(
    account: &accounts::Model,
    direction: InvoiceDirection,
) -> (Option<InvoicePeriodKind>, Option<DateTime<Utc>>) {
    match direction {
        InvoiceDirection::Customer => (
            account.customer_invoice_period.map(Into::into),
            account
                .next_customer_invoice_at
                .map(|at| at.with_timezone(&Utc)),
        ),
        InvoiceDirection::Vendor => (
            account.vendor_invoice_period.map(Into::into),
            account
                .next_vendor_invoice_at
                .map(|at| at.with_timezone(&Utc)),
        ),
    }
}

/// Start of the period preceding the scheduled boundary, for accounts
/// that have never been invoiced in this direction.
fn first_window_start(period: InvoicePeriodKind, boundary: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let boundary_local = local_date(boundary, tz);
    // Step one day back so a boundary sitting exactly on a period start
    // resolves to the period before it, not to itself.
    let reference = boundary_local
        .pred_opt()
        .unwrap_or(boundary_local);
    local_midnight_utc(period.initial_date(reference), tz)
}

/// The boundary one period after the current one.
fn advance_schedule_to(period: InvoicePeriodKind, boundary: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    // Nudge into the period so a boundary stored slightly before local
    // midnight still resolves to the calendar period it starts.
    let anchor = local_date(boundary + ChronoDuration::hours(1), tz);
    local_midnight_utc(period.next_date(period.initial_date(anchor)), tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_first_window_start_monthly_utc() {
        let tz: Tz = "UTC".parse().unwrap();
        // Boundary exactly on March 1st: the first window covers February.
        let start = first_window_start(InvoicePeriodKind::Monthly, utc(2026, 3, 1, 0), tz);
        assert_eq!(start, utc(2026, 2, 1, 0));
    }

    #[test]
    fn test_first_window_start_respects_timezone() {
        let tz: Tz = "Europe/Kyiv".parse().unwrap();
        // 22:00 UTC on Feb 28 is already March 1st local midnight in Kyiv.
        let boundary = utc(2026, 2, 28, 22);
        let start = first_window_start(InvoicePeriodKind::Monthly, boundary, tz);
        // February 1st local midnight, expressed in UTC (Kyiv is UTC+2).
        assert_eq!(start, utc(2026, 1, 31, 22));
    }

    #[test]
    fn test_advance_schedule_monthly() {
        let tz: Tz = "UTC".parse().unwrap();
        let next = advance_schedule_to(InvoicePeriodKind::Monthly, utc(2026, 3, 1, 0), tz);
        assert_eq!(next, utc(2026, 4, 1, 0));
    }

    #[test]
    fn test_advance_schedule_weekly() {
        let tz: Tz = "UTC".parse().unwrap();
        // Monday August 3rd 2026 -> Monday August 10th.
        let next = advance_schedule_to(InvoicePeriodKind::Weekly, utc(2026, 8, 3, 0), tz);
        assert_eq!(next, utc(2026, 8, 10, 0));
    }

    #[test]
    fn test_advance_schedule_crosses_year() {
        let tz: Tz = "UTC".parse().unwrap();
        let next = advance_schedule_to(InvoicePeriodKind::Monthly, utc(2026, 12, 1, 0), tz);
        assert_eq!(next, utc(2027, 1, 1, 0));
    }
}
