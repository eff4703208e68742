//! `SeaORM` entity definitions for the billing schema.

pub mod accounts;
pub mod balance_notification_settings;
pub mod contractors;
pub mod customer_auth_stats;
pub mod customer_auths;
pub mod invoice_notifications;
pub mod invoices;
pub mod sea_orm_active_enums;
