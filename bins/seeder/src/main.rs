//! Database seeder for Switchbill development and testing.
//!
//! Seeds a vendor and a customer contractor, their billing accounts with
//! notification settings, a customer auth, and a day of traffic stats.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use switchbill_db::entities::{
    accounts, balance_notification_settings, contractors, customer_auth_stats, customer_auths,
    sea_orm_active_enums::{InvoicePeriodKind, ThresholdState},
};

/// Vendor contractor ID (consistent for all seeds)
const VENDOR_CONTRACTOR_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Customer contractor ID (consistent for all seeds)
const CUSTOMER_CONTRACTOR_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Vendor account ID (consistent for all seeds)
const VENDOR_ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000011";
/// Customer account ID (consistent for all seeds)
const CUSTOMER_ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000012";
/// Customer auth ID (consistent for all seeds)
const CUSTOMER_AUTH_ID: &str = "00000000-0000-0000-0000-000000000021";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = switchbill_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding contractors...");
    seed_contractors(&db).await;

    println!("Seeding accounts...");
    seed_accounts(&db).await;

    println!("Seeding customer auth...");
    seed_customer_auth(&db).await;

    println!("Seeding traffic stats...");
    seed_stats(&db).await;

    println!("Seeding complete!");
}

fn id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap()
}

/// Seeds one vendor and one customer contractor.
async fn seed_contractors(db: &DatabaseConnection) {
    let now = Utc::now().into();
    let fixtures = [
        (VENDOR_CONTRACTOR_ID, "Acme Carrier", true, false),
        (CUSTOMER_CONTRACTOR_ID, "Globex Communications", false, true),
    ];

    for (raw_id, name, vendor, customer) in fixtures {
        if contractors::Entity::find_by_id(id(raw_id))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Contractor {name} already exists, skipping...");
            continue;
        }

        let contractor = contractors::ActiveModel {
            id: Set(id(raw_id)),
            name: Set(name.to_string()),
            vendor: Set(vendor),
            customer: Set(customer),
            enabled: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        contractor
            .insert(db)
            .await
            .expect("Failed to seed contractor");
    }
}

/// Seeds a billing account per contractor, with notification settings.
async fn seed_accounts(db: &DatabaseConnection) {
    let now = Utc::now().into();
    let next_boundary = Utc::now() + Duration::days(1);
    let fixtures = [
        (
            VENDOR_ACCOUNT_ID,
            VENDOR_CONTRACTOR_ID,
            "ACME-TERM-01",
            1001_i64,
            None,
            Some(InvoicePeriodKind::Monthly),
        ),
        (
            CUSTOMER_ACCOUNT_ID,
            CUSTOMER_CONTRACTOR_ID,
            "GLOBEX-ORIG-01",
            1002_i64,
            Some(InvoicePeriodKind::Monthly),
            None,
        ),
    ];

    for (raw_id, contractor_raw_id, name, external_id, customer_period, vendor_period) in fixtures {
        if accounts::Entity::find_by_id(id(raw_id))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Account {name} already exists, skipping...");
            continue;
        }

        let account = accounts::ActiveModel {
            id: Set(id(raw_id)),
            external_id: Set(Some(external_id)),
            contractor_id: Set(id(contractor_raw_id)),
            name: Set(name.to_string()),
            balance: Set(Decimal::new(5000, 2)),
            min_balance: Set(Decimal::new(-10000, 2)),
            max_balance: Set(Decimal::new(100_000, 2)),
            vat: Set(Decimal::new(20, 0)),
            destination_rate_limit: Set(None),
            max_call_duration: Set(Some(3600)),
            origination_capacity: Set(Some(100)),
            termination_capacity: Set(Some(100)),
            total_capacity: Set(Some(200)),
            timezone: Set("Europe/Kyiv".to_string()),
            customer_invoice_period: Set(customer_period),
            vendor_invoice_period: Set(vendor_period),
            next_customer_invoice_at: Set(customer_period.map(|_| next_boundary.into())),
            next_vendor_invoice_at: Set(vendor_period.map(|_| next_boundary.into())),
            customer_invoice_ref_template: Set("$id".to_string()),
            vendor_invoice_ref_template: Set("$id".to_string()),
            send_invoices_to: Set(vec!["billing@switchbill.local".to_string()]),
            created_at: Set(now),
            updated_at: Set(now),
        };
        account.insert(db).await.expect("Failed to seed account");

        let setting = balance_notification_settings::ActiveModel {
            id: Set(Uuid::now_v7()),
            account_id: Set(id(raw_id)),
            state: Set(ThresholdState::None),
            low_threshold: Set(Some(Decimal::ZERO)),
            high_threshold: Set(Some(Decimal::new(90_000, 2))),
            created_at: Set(now),
            updated_at: Set(now),
        };
        setting
            .insert(db)
            .await
            .expect("Failed to seed notification setting");
    }
}

/// Seeds one customer auth on the customer account.
async fn seed_customer_auth(db: &DatabaseConnection) {
    if customer_auths::Entity::find_by_id(id(CUSTOMER_AUTH_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Customer auth already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let auth = customer_auths::ActiveModel {
        id: Set(id(CUSTOMER_AUTH_ID)),
        name: Set("globex-pbx-main".to_string()),
        account_id: Set(id(CUSTOMER_ACCOUNT_ID)),
        external_id: Set(Some(2001)),
        external_type: Set(Some("pbx".to_string())),
        enabled: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    auth.insert(db).await.expect("Failed to seed customer auth");
}

/// Seeds 24 hourly stat rows for the customer auth.
async fn seed_stats(db: &DatabaseConnection) {
    let existing = customer_auth_stats::Entity::find().one(db).await.ok().flatten();
    if existing.is_some() {
        println!("  Traffic stats already exist, skipping...");
        return;
    }

    let now = Utc::now();
    for hour in 0..24_i64 {
        let stat = customer_auth_stats::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_auth_id: Set(id(CUSTOMER_AUTH_ID)),
            account_id: Set(id(CUSTOMER_ACCOUNT_ID)),
            timestamp: Set((now - Duration::hours(hour)).into()),
            customer_price: Set(Decimal::new(125, 2)),
            calls_count: Set(42),
            calls_duration: Set(3600),
        };
        stat.insert(db).await.expect("Failed to seed stat row");
    }
}
