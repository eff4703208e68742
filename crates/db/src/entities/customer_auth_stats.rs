//! `SeaORM` Entity for the customer_auth_stats table.
//!
//! Rolling traffic aggregates written by the switch; this system only
//! reads them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_auth_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_auth_id: Uuid,
    pub account_id: Uuid,
    pub timestamp: DateTimeWithTimeZone,
    pub customer_price: Decimal,
    pub calls_count: i64,
    pub calls_duration: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer_auths::Entity",
        from = "Column::CustomerAuthId",
        to = "super::customer_auths::Column::Id"
    )]
    CustomerAuths,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::customer_auths::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomerAuths.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
