//! Account repository for billing account database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Value,
};
use switchbill_core::account::{validate, AccountAttributes, AccountValidationError};
use switchbill_core::billing::InvoicePeriodKind;
use switchbill_shared::types::{CustomerAuthId, InvoiceId};
use uuid::Uuid;

use crate::entities::{
    accounts, balance_notification_settings, contractors, customer_auths, invoices,
    sea_orm_active_enums,
};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// One or more validation rules failed.
    #[error("Validation failed: {}", join_validation_errors(.0))]
    Validation(Vec<AccountValidationError>),

    /// Account name already exists.
    #[error("Account name '{0}' already exists")]
    DuplicateName(String),

    /// External id already exists.
    #[error("External id {0} already exists")]
    DuplicateExternalId(i64),

    /// Contractor not found.
    #[error("Contractor not found: {0}")]
    ContractorNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Cannot delete an account referenced by customer auths.
    #[error("Can't be deleted because linked to Customer Auth(s) #{}", join_ids(.ids))]
    HasCustomerAuths {
        /// Offending customer auth ids.
        ids: Vec<CustomerAuthId>,
    },

    /// Cannot delete an account with unapproved invoices.
    #[error("Can't be deleted because linked to unapproved Invoice(s) #{}", join_ids(.ids))]
    HasUnapprovedInvoices {
        /// Offending invoice ids.
        ids: Vec<InvoiceId>,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an account.
///
/// The balance always starts at zero; only administrators move it
/// afterwards via payments, which are outside this crate.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning contractor.
    pub contractor_id: Uuid,
    /// Account name (unique).
    pub name: String,
    /// Numeric id of the account on the switch, if known.
    pub external_id: Option<i64>,
    /// Lower balance bound.
    pub min_balance: Decimal,
    /// Upper balance bound.
    pub max_balance: Decimal,
    /// VAT percentage for customer invoices.
    pub vat: Decimal,
    /// Optional per-destination rate limit.
    pub destination_rate_limit: Option<Decimal>,
    /// Optional maximum call duration (seconds), doubles as invoice grace.
    pub max_call_duration: Option<i32>,
    /// Optional concurrent origination capacity.
    pub origination_capacity: Option<i16>,
    /// Optional concurrent termination capacity.
    pub termination_capacity: Option<i16>,
    /// Optional total concurrent capacity.
    pub total_capacity: Option<i16>,
    /// IANA timezone governing period boundaries.
    pub timezone: String,
    /// Customer invoice cadence, if customer invoicing is enabled.
    pub customer_invoice_period: Option<InvoicePeriodKind>,
    /// Vendor invoice cadence, if vendor invoicing is enabled.
    pub vendor_invoice_period: Option<InvoicePeriodKind>,
    /// Next scheduled customer invoice boundary.
    pub next_customer_invoice_at: Option<DateTime<Utc>>,
    /// Next scheduled vendor invoice boundary.
    pub next_vendor_invoice_at: Option<DateTime<Utc>>,
    /// Reference template for customer invoices.
    pub customer_invoice_ref_template: String,
    /// Reference template for vendor invoices.
    pub vendor_invoice_ref_template: String,
    /// Billing contact email addresses.
    pub send_invoices_to: Vec<String>,
}

/// Input for updating an account.
///
/// `None` leaves a field untouched; the inner `Option` of doubly-wrapped
/// fields clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account name.
    pub name: Option<String>,
    /// External id.
    pub external_id: Option<Option<i64>>,
    /// Lower balance bound.
    pub min_balance: Option<Decimal>,
    /// Upper balance bound.
    pub max_balance: Option<Decimal>,
    /// VAT percentage.
    pub vat: Option<Decimal>,
    /// Per-destination rate limit.
    pub destination_rate_limit: Option<Option<Decimal>>,
    /// Maximum call duration.
    pub max_call_duration: Option<Option<i32>>,
    /// Concurrent origination capacity.
    pub origination_capacity: Option<Option<i16>>,
    /// Concurrent termination capacity.
    pub termination_capacity: Option<Option<i16>>,
    /// Total concurrent capacity.
    pub total_capacity: Option<Option<i16>>,
    /// IANA timezone.
    pub timezone: Option<String>,
    /// Customer invoice cadence.
    pub customer_invoice_period: Option<Option<InvoicePeriodKind>>,
    /// Vendor invoice cadence.
    pub vendor_invoice_period: Option<Option<InvoicePeriodKind>>,
    /// Next customer invoice boundary.
    pub next_customer_invoice_at: Option<Option<DateTime<Utc>>>,
    /// Next vendor invoice boundary.
    pub next_vendor_invoice_at: Option<Option<DateTime<Utc>>>,
    /// Customer invoice reference template.
    pub customer_invoice_ref_template: Option<String>,
    /// Vendor invoice reference template.
    pub vendor_invoice_ref_template: Option<String>,
    /// Billing contact email addresses.
    pub send_invoices_to: Option<Vec<String>>,
}

/// Aggregated totals over a set of accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountTotals {
    /// Sum of account balances.
    pub total_balance: Decimal,
}

/// Account repository for CRUD operations and billing scopes.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account together with its balance notification
    /// setting, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A validation rule fails (all failures are reported at once)
    /// - Name or external id already exists
    /// - The contractor does not exist
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let errors = validate(&attributes_for_create(&input));
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let existing = accounts::Entity::find()
            .filter(accounts::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountError::DuplicateName(input.name));
        }

        if let Some(external_id) = input.external_id {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::ExternalId.eq(external_id))
                .one(&self.db)
                .await?;
            if existing.is_some() {
                return Err(AccountError::DuplicateExternalId(external_id));
            }
        }

        let contractor = contractors::Entity::find_by_id(input.contractor_id)
            .one(&self.db)
            .await?;
        if contractor.is_none() {
            return Err(AccountError::ContractorNotFound(input.contractor_id));
        }

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let account_id = Uuid::now_v7();

        let account = accounts::ActiveModel {
            id: Set(account_id),
            external_id: Set(input.external_id),
            contractor_id: Set(input.contractor_id),
            name: Set(input.name),
            balance: Set(Decimal::ZERO),
            min_balance: Set(input.min_balance),
            max_balance: Set(input.max_balance),
            vat: Set(input.vat),
            destination_rate_limit: Set(input.destination_rate_limit),
            max_call_duration: Set(input.max_call_duration),
            origination_capacity: Set(input.origination_capacity),
            termination_capacity: Set(input.termination_capacity),
            total_capacity: Set(input.total_capacity),
            timezone: Set(input.timezone),
            customer_invoice_period: Set(input.customer_invoice_period.map(Into::into)),
            vendor_invoice_period: Set(input.vendor_invoice_period.map(Into::into)),
            next_customer_invoice_at: Set(input.next_customer_invoice_at.map(Into::into)),
            next_vendor_invoice_at: Set(input.next_vendor_invoice_at.map(Into::into)),
            customer_invoice_ref_template: Set(input.customer_invoice_ref_template),
            vendor_invoice_ref_template: Set(input.vendor_invoice_ref_template),
            send_invoices_to: Set(input.send_invoices_to),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let setting = balance_notification_settings::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(account_id),
            state: Set(sea_orm_active_enums::ThresholdState::None),
            low_threshold: Set(None),
            high_threshold: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let txn = self.db.begin().await?;
        let account = account.insert(&txn).await?;
        setting.insert(&txn).await?;
        txn.commit().await?;

        Ok(account)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds an account together with its contractor.
    ///
    /// The contractor join is explicit; there is no implicit default
    /// scope anywhere in this repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_contractor(
        &self,
        id: Uuid,
    ) -> Result<Option<(accounts::Model, contractors::Model)>, AccountError> {
        let result = accounts::Entity::find_by_id(id)
            .find_also_related(contractors::Entity)
            .one(&self.db)
            .await?;

        Ok(result.and_then(|(account, contractor)| contractor.map(|c| (account, c))))
    }

    /// Updates an account with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, a validation rule
    /// fails on the merged record, or the new name/external id conflicts.
    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::AccountNotFound(id))?;

        let merged = attributes_for_update(&account, &input);
        let errors = validate(&merged);
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        if let Some(new_name) = &input.name
            && *new_name != account.name
        {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::Name.eq(new_name))
                .filter(accounts::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if existing.is_some() {
                return Err(AccountError::DuplicateName(new_name.clone()));
            }
        }

        if let Some(Some(new_external_id)) = input.external_id
            && account.external_id != Some(new_external_id)
        {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::ExternalId.eq(new_external_id))
                .filter(accounts::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if existing.is_some() {
                return Err(AccountError::DuplicateExternalId(new_external_id));
            }
        }

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(external_id) = input.external_id {
            active.external_id = Set(external_id);
        }
        if let Some(min_balance) = input.min_balance {
            active.min_balance = Set(min_balance);
        }
        if let Some(max_balance) = input.max_balance {
            active.max_balance = Set(max_balance);
        }
        if let Some(vat) = input.vat {
            active.vat = Set(vat);
        }
        if let Some(destination_rate_limit) = input.destination_rate_limit {
            active.destination_rate_limit = Set(destination_rate_limit);
        }
        if let Some(max_call_duration) = input.max_call_duration {
            active.max_call_duration = Set(max_call_duration);
        }
        if let Some(origination_capacity) = input.origination_capacity {
            active.origination_capacity = Set(origination_capacity);
        }
        if let Some(termination_capacity) = input.termination_capacity {
            active.termination_capacity = Set(termination_capacity);
        }
        if let Some(total_capacity) = input.total_capacity {
            active.total_capacity = Set(total_capacity);
        }
        if let Some(timezone) = input.timezone {
            active.timezone = Set(timezone);
        }
        if let Some(period) = input.customer_invoice_period {
            active.customer_invoice_period = Set(period.map(Into::into));
        }
        if let Some(period) = input.vendor_invoice_period {
            active.vendor_invoice_period = Set(period.map(Into::into));
        }
        if let Some(at) = input.next_customer_invoice_at {
            active.next_customer_invoice_at = Set(at.map(Into::into));
        }
        if let Some(at) = input.next_vendor_invoice_at {
            active.next_vendor_invoice_at = Set(at.map(Into::into));
        }
        if let Some(template) = input.customer_invoice_ref_template {
            active.customer_invoice_ref_template = Set(template);
        }
        if let Some(template) = input.vendor_invoice_ref_template {
            active.vendor_invoice_ref_template = Set(template);
        }
        if let Some(recipients) = input.send_invoices_to {
            active.send_invoices_to = Set(recipients);
        }
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an account, its notification setting cascading with it.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error listing the offending ids when
    /// customer auths or unapproved invoices still reference the account.
    pub async fn delete_account(&self, id: Uuid) -> Result<(), AccountError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AccountError::AccountNotFound(id))?;

        let auth_ids: Vec<Uuid> = customer_auths::Entity::find()
            .filter(customer_auths::Column::AccountId.eq(id))
            .select_only()
            .column(customer_auths::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        if !auth_ids.is_empty() {
            return Err(AccountError::HasCustomerAuths {
                ids: auth_ids
                    .into_iter()
                    .map(CustomerAuthId::from_uuid)
                    .collect(),
            });
        }

        let invoice_ids: Vec<Uuid> = invoices::Entity::find()
            .filter(invoices::Column::AccountId.eq(id))
            .filter(invoices::Column::State.ne(sea_orm_active_enums::InvoiceState::Approved))
            .select_only()
            .column(invoices::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        if !invoice_ids.is_empty() {
            return Err(AccountError::HasUnapprovedInvoices {
                ids: invoice_ids.into_iter().map(InvoiceId::from_uuid).collect(),
            });
        }

        accounts::Entity::delete_by_id(account.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Lists all accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find()
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Lists accounts whose contractor is a vendor.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn vendor_accounts(&self) -> Result<Vec<accounts::Model>, AccountError> {
        self.accounts_by_contractor_flag(contractors::Column::Vendor)
            .await
    }

    /// Lists accounts whose contractor is a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn customer_accounts(&self) -> Result<Vec<accounts::Model>, AccountError> {
        self.accounts_by_contractor_flag(contractors::Column::Customer)
            .await
    }

    async fn accounts_by_contractor_flag(
        &self,
        flag: contractors::Column,
    ) -> Result<Vec<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find()
            .inner_join(contractors::Entity)
            .filter(flag.eq(true))
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Searches accounts by `name | id`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_for(&self, term: &str) -> Result<Vec<accounts::Model>, AccountError> {
        let pattern = format!("%{term}%");
        Ok(accounts::Entity::find()
            .filter(Expr::cust_with_values(
                "accounts.name || ' | ' || accounts.id::text ILIKE ?",
                [pattern],
            ))
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Lists accounts whose balance sits at or beyond either bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn insufficient_balance(&self) -> Result<Vec<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::col(accounts::Column::Balance)
                            .lte(Expr::col(accounts::Column::MinBalance)),
                    )
                    .add(
                        Expr::col(accounts::Column::Balance)
                            .gte(Expr::col(accounts::Column::MaxBalance)),
                    ),
            )
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Lists accounts ready for customer invoicing at `now`.
    ///
    /// An account is ready when its customer period is configured and
    /// `next_customer_invoice_at` plus the grace period has elapsed. The
    /// grace period is the account's `max_call_duration`, falling back to
    /// `default_grace_secs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ready_for_customer_invoice(
        &self,
        default_grace_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::CustomerInvoicePeriod.is_not_null())
            .filter(accounts::Column::NextCustomerInvoiceAt.is_not_null())
            .filter(ready_expr(
                "next_customer_invoice_at",
                default_grace_secs,
                now,
            ))
            .all(&self.db)
            .await?)
    }

    /// Lists accounts ready for vendor invoicing at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ready_for_vendor_invoice(
        &self,
        default_grace_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<accounts::Model>, AccountError> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::VendorInvoicePeriod.is_not_null())
            .filter(accounts::Column::NextVendorInvoiceAt.is_not_null())
            .filter(ready_expr(
                "next_vendor_invoice_at",
                default_grace_secs,
                now,
            ))
            .all(&self.db)
            .await?)
    }

    /// Sums balances over all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals(&self) -> Result<AccountTotals, AccountError> {
        #[derive(Debug, FromQueryResult)]
        struct TotalsRow {
            total_balance: Option<Decimal>,
        }

        let row = accounts::Entity::find()
            .select_only()
            .column_as(accounts::Column::Balance.sum(), "total_balance")
            .into_model::<TotalsRow>()
            .one(&self.db)
            .await?;

        Ok(AccountTotals {
            total_balance: row.and_then(|r| r.total_balance).unwrap_or(Decimal::ZERO),
        })
    }
}

/// Builds the SQL readiness predicate for one invoice direction.
///
/// The grace arithmetic stays in SQL so the scan uses the partial indexes
/// on the `next_*_invoice_at` columns; both operands are bound parameters.
fn ready_expr(
    next_at_column: &str,
    default_grace_secs: i64,
    now: DateTime<Utc>,
) -> sea_orm::sea_query::SimpleExpr {
    Expr::cust_with_values(
        format!(
            "({next_at_column} + MAKE_INTERVAL(secs => \
             COALESCE(max_call_duration, ?)::double precision)) <= ?"
        ),
        [Value::from(default_grace_secs), Value::from(now)],
    )
}

fn attributes_for_create(input: &CreateAccountInput) -> AccountAttributes {
    AccountAttributes {
        name: input.name.clone(),
        balance: Decimal::ZERO,
        min_balance: input.min_balance,
        max_balance: input.max_balance,
        vat: input.vat,
        destination_rate_limit: input.destination_rate_limit,
        max_call_duration: input.max_call_duration,
        origination_capacity: input.origination_capacity,
        termination_capacity: input.termination_capacity,
        total_capacity: input.total_capacity,
        timezone: input.timezone.clone(),
        customer_invoice_ref_template: input.customer_invoice_ref_template.clone(),
        vendor_invoice_ref_template: input.vendor_invoice_ref_template.clone(),
    }
}

fn attributes_for_update(
    account: &accounts::Model,
    input: &UpdateAccountInput,
) -> AccountAttributes {
    AccountAttributes {
        name: input.name.clone().unwrap_or_else(|| account.name.clone()),
        balance: account.balance,
        min_balance: input.min_balance.unwrap_or(account.min_balance),
        max_balance: input.max_balance.unwrap_or(account.max_balance),
        vat: input.vat.unwrap_or(account.vat),
        destination_rate_limit: input
            .destination_rate_limit
            .unwrap_or(account.destination_rate_limit),
        max_call_duration: input.max_call_duration.unwrap_or(account.max_call_duration),
        origination_capacity: input
            .origination_capacity
            .unwrap_or(account.origination_capacity),
        termination_capacity: input
            .termination_capacity
            .unwrap_or(account.termination_capacity),
        total_capacity: input.total_capacity.unwrap_or(account.total_capacity),
        timezone: input
            .timezone
            .clone()
            .unwrap_or_else(|| account.timezone.clone()),
        customer_invoice_ref_template: input
            .customer_invoice_ref_template
            .clone()
            .unwrap_or_else(|| account.customer_invoice_ref_template.clone()),
        vendor_invoice_ref_template: input
            .vendor_invoice_ref_template
            .clone()
            .unwrap_or_else(|| account.vendor_invoice_ref_template.clone()),
    }
}

fn join_validation_errors(errors: &[AccountValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", #")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_input() -> CreateAccountInput {
        CreateAccountInput {
            contractor_id: Uuid::now_v7(),
            name: "TELCO-US-EAST".to_string(),
            external_id: Some(42),
            min_balance: dec!(-100),
            max_balance: dec!(1000),
            vat: dec!(20),
            destination_rate_limit: None,
            max_call_duration: Some(3600),
            origination_capacity: Some(100),
            termination_capacity: None,
            total_capacity: None,
            timezone: "UTC".to_string(),
            customer_invoice_period: Some(InvoicePeriodKind::Monthly),
            vendor_invoice_period: None,
            next_customer_invoice_at: None,
            next_vendor_invoice_at: None,
            customer_invoice_ref_template: "$id".to_string(),
            vendor_invoice_ref_template: "$id".to_string(),
            send_invoices_to: vec!["billing@telco.example".to_string()],
        }
    }

    #[test]
    fn test_create_attributes_start_with_zero_balance() {
        let attrs = attributes_for_create(&create_input());
        assert_eq!(attrs.balance, Decimal::ZERO);
        assert!(validate(&attrs).is_empty());
    }

    #[test]
    fn test_create_attributes_surface_validation_failures() {
        let mut input = create_input();
        input.min_balance = dec!(10);
        input.max_balance = dec!(5);
        let errors = validate(&attributes_for_create(&input));
        assert_eq!(
            errors,
            vec![AccountValidationError::BalanceBoundsInverted {
                min_balance: dec!(10),
                max_balance: dec!(5),
            }]
        );
    }

    fn existing_account() -> accounts::Model {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        accounts::Model {
            id: Uuid::now_v7(),
            external_id: Some(42),
            contractor_id: Uuid::now_v7(),
            name: "TELCO-US-EAST".to_string(),
            balance: dec!(12.5),
            min_balance: dec!(-100),
            max_balance: dec!(1000),
            vat: dec!(20),
            destination_rate_limit: None,
            max_call_duration: Some(3600),
            origination_capacity: Some(100),
            termination_capacity: None,
            total_capacity: None,
            timezone: "UTC".to_string(),
            customer_invoice_period: Some(sea_orm_active_enums::InvoicePeriodKind::Monthly),
            vendor_invoice_period: None,
            next_customer_invoice_at: None,
            next_vendor_invoice_at: None,
            customer_invoice_ref_template: "$id".to_string(),
            vendor_invoice_ref_template: "$id".to_string(),
            send_invoices_to: vec!["billing@telco.example".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_attributes_merge_over_current_record() {
        let account = existing_account();
        // A partial update touching only vat keeps everything else.
        let update = UpdateAccountInput {
            vat: Some(dec!(7)),
            ..UpdateAccountInput::default()
        };
        let merged = attributes_for_update(&account, &update);
        assert_eq!(merged.vat, dec!(7));
        assert_eq!(merged.name, account.name);
        assert_eq!(merged.max_call_duration, Some(3600));
        assert!(validate(&merged).is_empty());
    }

    #[test]
    fn test_update_attributes_can_clear_nullable_fields() {
        let account = existing_account();
        let update = UpdateAccountInput {
            max_call_duration: Some(None),
            ..UpdateAccountInput::default()
        };
        let merged = attributes_for_update(&account, &update);
        assert_eq!(merged.max_call_duration, None);
    }

    #[test]
    fn test_deletion_guard_message_lists_ids() {
        let a = CustomerAuthId::new();
        let b = CustomerAuthId::new();
        let error = AccountError::HasCustomerAuths { ids: vec![a, b] };
        let message = error.to_string();
        assert!(message.contains(&format!("#{a}, #{b}")));
        assert!(message.contains("Customer Auth"));
    }

    proptest::proptest! {
        /// Every id appears in the guard message exactly as `#<id>`.
        #[test]
        fn prop_join_ids_lists_every_id(count in 1usize..6) {
            let ids: Vec<InvoiceId> = (0..count).map(|_| InvoiceId::new()).collect();
            let error = AccountError::HasUnapprovedInvoices { ids: ids.clone() };
            let message = error.to_string();
            for id in &ids {
                let needle = format!("#{id}");
                proptest::prop_assert!(message.contains(&needle));
            }
        }

        /// A merge never invents values: every merged field comes either
        /// from the update or from the stored record.
        #[test]
        fn prop_update_merge_takes_update_or_original(
            vat in proptest::option::of(0i64..=100),
            min_balance in proptest::option::of(-1000i64..1000),
        ) {
            let account = existing_account();
            let update = UpdateAccountInput {
                vat: vat.map(Decimal::from),
                min_balance: min_balance.map(Decimal::from),
                ..UpdateAccountInput::default()
            };
            let merged = attributes_for_update(&account, &update);
            proptest::prop_assert_eq!(
                merged.vat,
                update.vat.unwrap_or(account.vat)
            );
            proptest::prop_assert_eq!(
                merged.min_balance,
                update.min_balance.unwrap_or(account.min_balance)
            );
        }
    }

    #[test]
    fn test_validation_error_message_joins_failures() {
        let error = AccountError::Validation(vec![
            AccountValidationError::NameRequired,
            AccountValidationError::MaxCallDurationNotPositive(0),
        ]);
        let message = error.to_string();
        assert!(message.contains("name must be present"));
        assert!(message.contains("; "));
    }
}
