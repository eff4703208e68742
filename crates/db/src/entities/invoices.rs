//! `SeaORM` Entity for the invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{InvoiceDirection, InvoiceState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub account_id: Uuid,
    pub contractor_id: Uuid,
    pub direction: InvoiceDirection,
    pub state: InvoiceState,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub amount: Decimal,
    pub calls_count: i64,
    pub calls_duration: i64,
    pub billing_duration: i64,
    pub successful_calls_count: Option<i64>,
    pub first_call_at: Option<DateTimeWithTimeZone>,
    pub last_call_at: Option<DateTimeWithTimeZone>,
    pub first_successful_call_at: Option<DateTimeWithTimeZone>,
    pub last_successful_call_at: Option<DateTimeWithTimeZone>,
    pub reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::contractors::Entity",
        from = "Column::ContractorId",
        to = "super::contractors::Column::Id"
    )]
    Contractors,
    #[sea_orm(has_many = "super::invoice_notifications::Entity")]
    InvoiceNotifications,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::contractors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractors.def()
    }
}

impl Related<super::invoice_notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceNotifications.def()
    }
}

impl Model {
    /// Admin-facing label.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("Invoice {}", self.uuid)
    }
}

impl ActiveModelBehavior for ActiveModel {}
