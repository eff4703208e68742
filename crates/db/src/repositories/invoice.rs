//! Invoice repository: creation, workflow transitions, cover queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Alias;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use switchbill_core::invoice::{
    reference::render_reference, validation, InvoiceDirection, InvoiceError, InvoiceState,
    InvoiceTotals, InvoiceWorkflow,
};
use uuid::Uuid;

use crate::entities::{accounts, invoice_notifications, invoices, sea_orm_active_enums};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceRepositoryError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] InvoiceError),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// The invoiced account.
    pub account_id: Uuid,
    /// Invoice direction.
    pub direction: InvoiceDirection,
    /// Start of the covered range (inclusive).
    pub start_date: DateTime<Utc>,
    /// End of the covered range (exclusive).
    pub end_date: DateTime<Utc>,
    /// Invoiced amount; zero for freshly generated invoices.
    pub amount: Decimal,
    /// Number of calls in the range.
    pub calls_count: i64,
    /// Total call duration, in seconds.
    pub calls_duration: i64,
    /// Total billed duration, in seconds.
    pub billing_duration: i64,
}

impl CreateInvoiceInput {
    /// Input for a freshly generated invoice with zeroed totals.
    #[must_use]
    pub fn empty(
        account_id: Uuid,
        direction: InvoiceDirection,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            direction,
            start_date,
            end_date,
            amount: Decimal::ZERO,
            calls_count: 0,
            calls_duration: 0,
            billing_duration: 0,
        }
    }
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Restrict to one account.
    pub account_id: Option<Uuid>,
    /// Restrict to one direction.
    pub direction: Option<InvoiceDirection>,
    /// Restrict to one workflow state.
    pub state: Option<InvoiceState>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice in state `new`.
    ///
    /// The reference is rendered from the account's template for the
    /// given direction and the contractor is denormalized from the
    /// account.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the account is missing.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceRepositoryError> {
        Self::create_on(&self.db, input).await
    }

    /// Creates an invoice and advances the account's invoice schedule for
    /// the same direction, in one transaction.
    ///
    /// Used by the generation job so a crash between the two writes can
    /// never leave the account re-invoicing the same window.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the account is missing.
    pub async fn create_invoice_and_advance(
        &self,
        input: CreateInvoiceInput,
        next_invoice_at: DateTime<Utc>,
    ) -> Result<invoices::Model, InvoiceRepositoryError> {
        let account_id = input.account_id;
        let direction = input.direction;

        let txn = self.db.begin().await?;
        let invoice = Self::create_on(&txn, input).await?;
        Self::advance_schedule_on(&txn, account_id, direction, next_invoice_at).await?;
        txn.commit().await?;

        Ok(invoice)
    }

    /// Advances the account's invoice schedule without creating an
    /// invoice (used when the window was already covered).
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing.
    pub async fn advance_schedule(
        &self,
        account_id: Uuid,
        direction: InvoiceDirection,
        next_invoice_at: DateTime<Utc>,
    ) -> Result<(), InvoiceRepositoryError> {
        Self::advance_schedule_on(&self.db, account_id, direction, next_invoice_at).await
    }

    async fn create_on<C: ConnectionTrait>(
        conn: &C,
        input: CreateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceRepositoryError> {
        validation::validate_dates(input.start_date, input.end_date)?;
        validation::validate_totals(
            input.amount,
            input.calls_count,
            input.calls_duration,
            input.billing_duration,
        )?;

        let account = accounts::Entity::find_by_id(input.account_id)
            .one(conn)
            .await?
            .ok_or(InvoiceRepositoryError::AccountNotFound(input.account_id))?;

        let public_uuid = Uuid::new_v4();
        let template = match input.direction {
            InvoiceDirection::Customer => &account.customer_invoice_ref_template,
            InvoiceDirection::Vendor => &account.vendor_invoice_ref_template,
        };
        let reference = render_reference(template, public_uuid);

        let invoice = invoices::ActiveModel {
            id: Set(Uuid::now_v7()),
            uuid: Set(public_uuid),
            account_id: Set(account.id),
            contractor_id: Set(account.contractor_id),
            direction: Set(input.direction.into()),
            state: Set(sea_orm_active_enums::InvoiceState::New),
            start_date: Set(input.start_date.into()),
            end_date: Set(input.end_date.into()),
            amount: Set(input.amount),
            calls_count: Set(input.calls_count),
            calls_duration: Set(input.calls_duration),
            billing_duration: Set(input.billing_duration),
            successful_calls_count: Set(None),
            first_call_at: Set(None),
            last_call_at: Set(None),
            first_successful_call_at: Set(None),
            last_successful_call_at: Set(None),
            reference: Set(Some(reference)),
            created_at: Set(Utc::now().into()),
        };

        Ok(invoice.insert(conn).await?)
    }

    async fn advance_schedule_on<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        direction: InvoiceDirection,
        next_invoice_at: DateTime<Utc>,
    ) -> Result<(), InvoiceRepositoryError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await?
            .ok_or(InvoiceRepositoryError::AccountNotFound(account_id))?;

        let mut active: accounts::ActiveModel = account.into();
        match direction {
            InvoiceDirection::Customer => {
                active.next_customer_invoice_at = Set(Some(next_invoice_at.into()));
            }
            InvoiceDirection::Vendor => {
                active.next_vendor_invoice_at = Set(Some(next_invoice_at.into()));
            }
        }
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        Ok(())
    }

    /// Finds an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_invoice_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<invoices::Model>, InvoiceRepositoryError> {
        Ok(invoices::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists invoices matching the filter, newest range first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        filter: InvoiceFilter,
    ) -> Result<Vec<invoices::Model>, InvoiceRepositoryError> {
        let mut query = invoices::Entity::find().order_by_desc(invoices::Column::StartDate);

        if let Some(account_id) = filter.account_id {
            query = query.filter(invoices::Column::AccountId.eq(account_id));
        }
        if let Some(direction) = filter.direction {
            let direction: sea_orm_active_enums::InvoiceDirection = direction.into();
            query = query.filter(invoices::Column::Direction.eq(direction));
        }
        if let Some(state) = filter.state {
            let state: sea_orm_active_enums::InvoiceState = state.into();
            query = query.filter(invoices::Column::State.eq(state));
        }

        Ok(query.all(&self.db).await?)
    }

    /// Lists invoices already covering any part of the candidate window
    /// `[window_start, window_end)` for one account and direction.
    ///
    /// Used by generation to prevent double-invoicing; windows that are
    /// exactly adjacent do not count as covered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn covering(
        &self,
        account_id: Uuid,
        direction: InvoiceDirection,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<invoices::Model>, InvoiceRepositoryError> {
        let direction: sea_orm_active_enums::InvoiceDirection = direction.into();
        Ok(invoices::Entity::find()
            .filter(invoices::Column::AccountId.eq(account_id))
            .filter(invoices::Column::Direction.eq(direction))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(invoices::Column::StartDate.lt(window_start))
                            .add(invoices::Column::EndDate.gt(window_start)),
                    )
                    .add(
                        Condition::all()
                            .add(invoices::Column::StartDate.gte(window_start))
                            .add(invoices::Column::StartDate.lt(window_end)),
                    ),
            )
            .all(&self.db)
            .await?)
    }

    /// End date of the latest invoice for one account and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn latest_end_date(
        &self,
        account_id: Uuid,
        direction: InvoiceDirection,
    ) -> Result<Option<DateTime<Utc>>, InvoiceRepositoryError> {
        let direction: sea_orm_active_enums::InvoiceDirection = direction.into();
        let invoice = invoices::Entity::find()
            .filter(invoices::Column::AccountId.eq(account_id))
            .filter(invoices::Column::Direction.eq(direction))
            .order_by_desc(invoices::Column::EndDate)
            .one(&self.db)
            .await?;

        Ok(invoice.map(|i| i.end_date.with_timezone(&Utc)))
    }

    /// Moves a `new` invoice to `pending`.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or not in state `new`.
    pub async fn submit(&self, id: Uuid) -> Result<invoices::Model, InvoiceRepositoryError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceRepositoryError::InvoiceNotFound(id))?;

        let action = InvoiceWorkflow::submit(invoice.state.into())?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.state = Set(action.new_state().into());
        Ok(active.update(&self.db).await?)
    }

    /// Approves a `pending` invoice and queues its customer notification.
    ///
    /// The state change and the outbox row commit in one transaction;
    /// actually sending the email is the delivery job's concern, so a
    /// delivery failure can never roll back an approval. Approving a
    /// non-pending invoice is rejected, which also guarantees the
    /// notification is queued at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or not `pending`.
    pub async fn approve(&self, id: Uuid) -> Result<invoices::Model, InvoiceRepositoryError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceRepositoryError::InvoiceNotFound(id))?;

        let action = InvoiceWorkflow::approve(invoice.state.into())?;

        let account = accounts::Entity::find_by_id(invoice.account_id)
            .one(&txn)
            .await?
            .ok_or(InvoiceRepositoryError::AccountNotFound(invoice.account_id))?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.state = Set(action.new_state().into());
        let approved = active.update(&txn).await?;

        // No contacts configured means nothing to deliver; the approval
        // itself still stands.
        if !account.send_invoices_to.is_empty() {
            let outbox = invoice_notifications::ActiveModel {
                id: Set(Uuid::now_v7()),
                invoice_id: Set(approved.id),
                recipients: Set(account.send_invoices_to.join(",")),
                state: Set(sea_orm_active_enums::DeliveryState::Queued),
                attempts: Set(0),
                last_error: Set(None),
                queued_at: Set(Utc::now().into()),
                delivered_at: Set(None),
            };
            outbox.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(approved)
    }

    /// Sums amount and usage counters over invoices matching the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals(
        &self,
        filter: InvoiceFilter,
    ) -> Result<InvoiceTotals, InvoiceRepositoryError> {
        #[derive(Debug, FromQueryResult)]
        struct TotalsRow {
            total_amount: Option<Decimal>,
            total_calls_count: Option<i64>,
            total_calls_duration: Option<i64>,
            total_billing_duration: Option<i64>,
        }

        let mut query = invoices::Entity::find().select_only();
        if let Some(account_id) = filter.account_id {
            query = query.filter(invoices::Column::AccountId.eq(account_id));
        }
        if let Some(direction) = filter.direction {
            let direction: sea_orm_active_enums::InvoiceDirection = direction.into();
            query = query.filter(invoices::Column::Direction.eq(direction));
        }
        if let Some(state) = filter.state {
            let state: sea_orm_active_enums::InvoiceState = state.into();
            query = query.filter(invoices::Column::State.eq(state));
        }

        // SUM(bigint) yields numeric in Postgres, so cast back.
        let row = query
            .column_as(invoices::Column::Amount.sum(), "total_amount")
            .column_as(
                invoices::Column::CallsCount
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total_calls_count",
            )
            .column_as(
                invoices::Column::CallsDuration
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total_calls_duration",
            )
            .column_as(
                invoices::Column::BillingDuration
                    .sum()
                    .cast_as(Alias::new("BIGINT")),
                "total_billing_duration",
            )
            .into_model::<TotalsRow>()
            .one(&self.db)
            .await?;

        let row = row.unwrap_or(TotalsRow {
            total_amount: None,
            total_calls_count: None,
            total_calls_duration: None,
            total_billing_duration: None,
        });

        Ok(InvoiceTotals {
            total_amount: row.total_amount.unwrap_or(Decimal::ZERO),
            total_calls_count: row.total_calls_count.unwrap_or(0),
            total_calls_duration: row.total_calls_duration.unwrap_or(0),
            total_billing_duration: row.total_billing_duration.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_input_has_zero_totals() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let input =
            CreateInvoiceInput::empty(Uuid::now_v7(), InvoiceDirection::Customer, start, end);
        assert_eq!(input.amount, Decimal::ZERO);
        assert_eq!(input.calls_count, 0);
        assert!(validation::validate_dates(input.start_date, input.end_date).is_ok());
    }

    #[test]
    fn test_domain_errors_pass_through() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let error: InvoiceRepositoryError = validation::validate_dates(at, at).unwrap_err().into();
        assert!(matches!(
            error,
            InvoiceRepositoryError::Domain(InvoiceError::StartNotBeforeEnd { .. })
        ));
    }
}
