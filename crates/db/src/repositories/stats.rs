//! Stats repository: rolling traffic aggregates for the metrics push.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement};
use uuid::Uuid;

/// One aggregated sample per (account, customer auth) pair.
#[derive(Debug, Clone, FromQueryResult)]
pub struct CustomerAuthStatRow {
    /// Account id.
    pub account_id: Uuid,
    /// Numeric id of the account on the switch.
    pub account_external_id: Option<i64>,
    /// Customer auth id.
    pub customer_auth_id: Uuid,
    /// Numeric id of the auth on the switch.
    pub customer_auth_external_id: Option<i64>,
    /// External system type of the auth.
    pub customer_auth_external_type: Option<String>,
    /// Summed customer price over the window.
    pub customer_price: Decimal,
}

/// Stats repository.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    db: DatabaseConnection,
}

impl StatsRepository {
    /// Creates a new stats repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Rolling 24-hour price aggregate per (account, customer auth).
    ///
    /// Pairs without traffic in the window produce no row; consumers
    /// treat a missing sample as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn last_24h(&self, now: DateTime<Utc>) -> Result<Vec<CustomerAuthStatRow>, DbErr> {
        let since = now - Duration::hours(24);

        CustomerAuthStatRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"SELECT s.account_id,
                     a.external_id   AS account_external_id,
                     s.customer_auth_id,
                     ca.external_id  AS customer_auth_external_id,
                     ca.external_type AS customer_auth_external_type,
                     SUM(s.customer_price) AS customer_price
              FROM customer_auth_stats s
              INNER JOIN customer_auths ca ON ca.id = s.customer_auth_id
              INNER JOIN accounts a ON a.id = s.account_id
              WHERE s.timestamp > $1
              GROUP BY s.account_id, a.external_id,
                       s.customer_auth_id, ca.external_id, ca.external_type",
            [since.into()],
        ))
        .all(&self.db)
        .await
    }
}
