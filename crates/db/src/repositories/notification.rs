//! Notification repository: balance threshold transitions and the
//! invoice notification outbox.
//!
//! The threshold scope is the typed rebuild of the original four-clause
//! SQL disjunction; states are compared as native enums and thresholds as
//! bound columns, never as interpolated text.

use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use switchbill_core::threshold::{evaluate, ThresholdEvent, ThresholdState};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{DeliveryState, ThresholdState as DbThresholdState};
use crate::entities::{accounts, balance_notification_settings, invoice_notifications, invoices};

/// An account whose notification setting demands a transition.
#[derive(Debug, Clone)]
pub struct PendingThreshold {
    /// The account.
    pub account: accounts::Model,
    /// Its balance notification setting.
    pub setting: balance_notification_settings::Model,
}

impl PendingThreshold {
    /// The transition the notifier must apply, re-derived from the pure
    /// state machine so the SQL scope and the domain logic cannot drift
    /// apart silently.
    #[must_use]
    pub fn event(&self) -> Option<ThresholdEvent> {
        evaluate(
            self.setting.state.into(),
            self.account.balance,
            self.setting.low_threshold,
            self.setting.high_threshold,
        )
    }
}

/// Notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Accounts whose threshold state must transition.
    ///
    /// Mirrors `switchbill_core::threshold::evaluate` as one indexed
    /// query: fired states that should clear, plus `none` states where a
    /// configured threshold has been strictly crossed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn requiring_notification(&self) -> Result<Vec<PendingThreshold>, DbErr> {
        let balance = || Expr::col((accounts::Entity, accounts::Column::Balance));
        let low = || {
            Expr::col((
                balance_notification_settings::Entity,
                balance_notification_settings::Column::LowThreshold,
            ))
        };
        let high = || {
            Expr::col((
                balance_notification_settings::Entity,
                balance_notification_settings::Column::HighThreshold,
            ))
        };

        let condition = Condition::any()
            // clear low
            .add(
                Condition::all()
                    .add(
                        balance_notification_settings::Column::State
                            .eq(DbThresholdState::LowFired),
                    )
                    .add(
                        Condition::any()
                            .add(balance_notification_settings::Column::LowThreshold.is_null())
                            .add(balance().gt(low())),
                    ),
            )
            // clear high
            .add(
                Condition::all()
                    .add(
                        balance_notification_settings::Column::State
                            .eq(DbThresholdState::HighFired),
                    )
                    .add(
                        Condition::any()
                            .add(balance_notification_settings::Column::HighThreshold.is_null())
                            .add(balance().lt(high())),
                    ),
            )
            // fire low
            .add(
                Condition::all()
                    .add(balance_notification_settings::Column::State.eq(DbThresholdState::None))
                    .add(balance_notification_settings::Column::LowThreshold.is_not_null())
                    .add(balance().lt(low())),
            )
            // fire high
            .add(
                Condition::all()
                    .add(balance_notification_settings::Column::State.eq(DbThresholdState::None))
                    .add(balance_notification_settings::Column::HighThreshold.is_not_null())
                    .add(balance().gt(high())),
            );

        let rows = accounts::Entity::find()
            .find_also_related(balance_notification_settings::Entity)
            .filter(condition)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(account, setting)| {
                setting.map(|setting| PendingThreshold { account, setting })
            })
            .collect())
    }

    /// Applies a threshold transition.
    ///
    /// Guarded on the setting still being in `expected_state`, so a
    /// concurrent sweep can never double-apply; returns `false` when the
    /// guard did not match.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn apply_transition(
        &self,
        setting_id: Uuid,
        expected_state: ThresholdState,
        event: ThresholdEvent,
    ) -> Result<bool, DbErr> {
        let expected: DbThresholdState = expected_state.into();
        let next: DbThresholdState = event.next_state().into();

        // col_expr bypasses the entity's enum save_as, so cast explicitly.
        let result = balance_notification_settings::Entity::update_many()
            .col_expr(
                balance_notification_settings::Column::State,
                Expr::value(next).cast_as(Alias::new("balance_threshold_state")),
            )
            .col_expr(
                balance_notification_settings::Column::UpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(balance_notification_settings::Column::Id.eq(setting_id))
            .filter(balance_notification_settings::Column::State.eq(expected))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Queued invoice notifications, oldest first, with their invoices.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn queued_notifications(
        &self,
    ) -> Result<Vec<(invoice_notifications::Model, invoices::Model)>, DbErr> {
        let rows = invoice_notifications::Entity::find()
            .find_also_related(invoices::Entity)
            .filter(invoice_notifications::Column::State.eq(DeliveryState::Queued))
            .order_by_asc(invoice_notifications::Column::QueuedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(notification, invoice)| {
                invoice.map(|invoice| (notification, invoice))
            })
            .collect())
    }

    /// Marks a queued notification as delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn mark_delivered(&self, id: Uuid) -> Result<(), DbErr> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let notification = invoice_notifications::ActiveModel {
            id: Set(id),
            state: Set(DeliveryState::Delivered),
            delivered_at: Set(Some(now)),
            ..Default::default()
        };
        notification.update(&self.db).await?;
        Ok(())
    }

    /// Records a failed delivery attempt.
    ///
    /// The notification stays `queued` for the next sweep until
    /// `max_attempts` is exhausted, then flips to `failed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification is missing or the query fails.
    pub async fn record_failure(
        &self,
        id: Uuid,
        error_message: &str,
        max_attempts: i32,
    ) -> Result<(), DbErr> {
        let notification = invoice_notifications::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("invoice_notification {id}")))?;

        let attempts = notification.attempts + 1;
        let state = if attempts >= max_attempts {
            DeliveryState::Failed
        } else {
            DeliveryState::Queued
        };

        let mut active: invoice_notifications::ActiveModel = notification.into();
        active.attempts = Set(attempts);
        active.last_error = Set(Some(error_message.to_string()));
        active.state = Set(state);
        active.update(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pending(
        balance: rust_decimal::Decimal,
        state: DbThresholdState,
        low: Option<rust_decimal::Decimal>,
        high: Option<rust_decimal::Decimal>,
    ) -> PendingThreshold {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let account_id = Uuid::now_v7();
        PendingThreshold {
            account: accounts::Model {
                id: account_id,
                external_id: None,
                contractor_id: Uuid::now_v7(),
                name: "ACC".to_string(),
                balance,
                min_balance: dec!(0),
                max_balance: dec!(0),
                vat: dec!(0),
                destination_rate_limit: None,
                max_call_duration: None,
                origination_capacity: None,
                termination_capacity: None,
                total_capacity: None,
                timezone: "UTC".to_string(),
                customer_invoice_period: None,
                vendor_invoice_period: None,
                next_customer_invoice_at: None,
                next_vendor_invoice_at: None,
                customer_invoice_ref_template: "$id".to_string(),
                vendor_invoice_ref_template: "$id".to_string(),
                send_invoices_to: vec![],
                created_at: now,
                updated_at: now,
            },
            setting: balance_notification_settings::Model {
                id: Uuid::now_v7(),
                account_id,
                state,
                low_threshold: low,
                high_threshold: high,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn test_event_rederives_fire_low() {
        let row = pending(dec!(5), DbThresholdState::None, Some(dec!(10)), None);
        assert_eq!(row.event(), Some(ThresholdEvent::FireLow));
    }

    #[test]
    fn test_event_rederives_clear_high() {
        let row = pending(dec!(50), DbThresholdState::HighFired, None, Some(dec!(100)));
        assert_eq!(row.event(), Some(ThresholdEvent::ClearHigh));
    }

    #[test]
    fn test_event_is_none_when_state_is_settled() {
        // A row the SQL scope would not have matched.
        let row = pending(dec!(50), DbThresholdState::None, Some(dec!(10)), Some(dec!(100)));
        assert_eq!(row.event(), None);
    }
}
