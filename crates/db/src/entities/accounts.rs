//! `SeaORM` Entity for the accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoicePeriodKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_id: Option<i64>,
    pub contractor_id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub balance: Decimal,
    pub min_balance: Decimal,
    pub max_balance: Decimal,
    pub vat: Decimal,
    pub destination_rate_limit: Option<Decimal>,
    pub max_call_duration: Option<i32>,
    pub origination_capacity: Option<i16>,
    pub termination_capacity: Option<i16>,
    pub total_capacity: Option<i16>,
    pub timezone: String,
    pub customer_invoice_period: Option<InvoicePeriodKind>,
    pub vendor_invoice_period: Option<InvoicePeriodKind>,
    pub next_customer_invoice_at: Option<DateTimeWithTimeZone>,
    pub next_vendor_invoice_at: Option<DateTimeWithTimeZone>,
    pub customer_invoice_ref_template: String,
    pub vendor_invoice_ref_template: String,
    pub send_invoices_to: Vec<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contractors::Entity",
        from = "Column::ContractorId",
        to = "super::contractors::Column::Id"
    )]
    Contractors,
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
    #[sea_orm(has_one = "super::balance_notification_settings::Entity")]
    BalanceNotificationSettings,
    #[sea_orm(has_many = "super::customer_auths::Entity")]
    CustomerAuths,
    #[sea_orm(has_many = "super::customer_auth_stats::Entity")]
    CustomerAuthStats,
}

impl Related<super::contractors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractors.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::balance_notification_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BalanceNotificationSettings.def()
    }
}

impl Related<super::customer_auths::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerAuths.def()
    }
}

impl Model {
    /// Admin-facing label, `name | id`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} | {}", self.name, self.id)
    }
}

impl ActiveModelBehavior for ActiveModel {}
