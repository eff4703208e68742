//! Stats export tick.
//!
//! Every fixed interval the job fetches the rolling 24-hour price
//! aggregate per (account, customer auth) pair and forwards one labeled
//! JSON sample per pair to the metrics collector. The push is stateless
//! and idempotent from the collector's perspective, so a failed sample is
//! logged and skipped, never retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use switchbill_db::repositories::stats::CustomerAuthStatRow;
use switchbill_db::StatsRepository;
use switchbill_shared::types::{AccountId, CustomerAuthId};
use tracing::{debug, info, warn};

use crate::{scheduler, JobContext};

/// One metric sample pushed to the collector.
#[derive(Debug, Serialize)]
pub struct CustomerAuthSample {
    /// Summed customer price over the last 24 hours.
    pub last24h_customer_price: f64,
    /// Label map identifying the (account, customer auth) pair.
    pub labels: SampleLabels,
}

/// Labels attached to a sample.
#[derive(Debug, Serialize)]
pub struct SampleLabels {
    /// Account id.
    pub account_id: AccountId,
    /// Numeric id of the account on the switch.
    pub account_external_id: Option<i64>,
    /// Customer auth id.
    pub customer_auth_id: CustomerAuthId,
    /// Numeric id of the auth on the switch.
    pub customer_auth_external_id: Option<i64>,
    /// External system type of the auth.
    pub customer_auth_external_type: Option<String>,
}

impl From<&CustomerAuthStatRow> for CustomerAuthSample {
    fn from(row: &CustomerAuthStatRow) -> Self {
        Self {
            last24h_customer_price: row.customer_price.to_f64().unwrap_or_default(),
            labels: SampleLabels {
                account_id: AccountId::from_uuid(row.account_id),
                account_external_id: row.account_external_id,
                customer_auth_id: CustomerAuthId::from_uuid(row.customer_auth_id),
                customer_auth_external_id: row.customer_auth_external_id,
                customer_auth_external_type: row.customer_auth_external_type.clone(),
            },
        }
    }
}

/// Runs the stats export loop.
pub async fn run(ctx: Arc<JobContext>) {
    if !ctx.config.metrics.enabled {
        info!("stats export disabled by configuration");
        return;
    }

    let period = Duration::from_secs(ctx.config.metrics.export_interval_secs);
    scheduler::run_every("stats_export", period, move || {
        let ctx = Arc::clone(&ctx);
        async move { tick(&ctx).await }
    })
    .await;
}

/// One export sweep.
///
/// # Errors
///
/// Returns an error when the aggregate query fails; individual send
/// failures are logged and skipped.
pub async fn tick(ctx: &JobContext) -> anyhow::Result<()> {
    let repo = StatsRepository::new(ctx.db.clone());
    let rows = repo.last_24h(Utc::now()).await?;
    debug!(samples = rows.len(), "pushing customer auth stats");

    for row in &rows {
        let sample = CustomerAuthSample::from(row);
        let result = ctx
            .http
            .post(&ctx.config.metrics.collector_url)
            .json(&sample)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        if let Err(err) = result {
            warn!(
                account_id = %sample.labels.account_id,
                customer_auth_id = %sample.labels.customer_auth_id,
                error = %err,
                "failed to push stats sample"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn row() -> CustomerAuthStatRow {
        CustomerAuthStatRow {
            account_id: Uuid::now_v7(),
            account_external_id: Some(1001),
            customer_auth_id: Uuid::now_v7(),
            customer_auth_external_id: Some(2002),
            customer_auth_external_type: Some("pbx".to_string()),
            customer_price: dec!(12.34),
        }
    }

    #[test]
    fn test_sample_payload_shape() {
        let row = row();
        let sample = CustomerAuthSample::from(&row);
        let json = serde_json::to_value(&sample).unwrap();

        assert_eq!(json["last24h_customer_price"], 12.34);
        assert_eq!(
            json["labels"]["account_id"],
            row.account_id.to_string()
        );
        assert_eq!(json["labels"]["account_external_id"], 1001);
        assert_eq!(
            json["labels"]["customer_auth_id"],
            row.customer_auth_id.to_string()
        );
        assert_eq!(json["labels"]["customer_auth_external_id"], 2002);
        assert_eq!(json["labels"]["customer_auth_external_type"], "pbx");
    }

    #[test]
    fn test_sample_preserves_missing_external_ids() {
        let mut row = row();
        row.account_external_id = None;
        row.customer_auth_external_type = None;
        let json = serde_json::to_value(CustomerAuthSample::from(&row)).unwrap();
        assert!(json["labels"]["account_external_id"].is_null());
        assert!(json["labels"]["customer_auth_external_type"].is_null());
    }
}
