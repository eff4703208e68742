//! Initial database migration.
//!
//! Creates the billing schema: enums, contractors, accounts, notification
//! settings, invoices, the invoice notification outbox, customer auths,
//! and traffic stats.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CONTRACTORS & ACCOUNTS
        // ============================================================
        db.execute_unprepared(CONTRACTORS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(BALANCE_NOTIFICATION_SETTINGS_SQL).await?;

        // ============================================================
        // PART 3: INVOICES
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_NOTIFICATIONS_SQL).await?;

        // ============================================================
        // PART 4: CUSTOMER AUTHS & STATS
        // ============================================================
        db.execute_unprepared(CUSTOMER_AUTHS_SQL).await?;
        db.execute_unprepared(CUSTOMER_AUTH_STATS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Invoice workflow state
CREATE TYPE invoice_state AS ENUM ('new', 'pending', 'approved');

-- Invoice direction
CREATE TYPE invoice_direction AS ENUM ('customer', 'vendor');

-- Invoice period cadence
CREATE TYPE invoice_period_kind AS ENUM ('weekly', 'biweekly', 'monthly');

-- Balance threshold notification state
CREATE TYPE balance_threshold_state AS ENUM ('none', 'low_fired', 'high_fired');

-- Outbox delivery state
CREATE TYPE delivery_state AS ENUM ('queued', 'delivered', 'failed');
";

const CONTRACTORS_SQL: &str = r"
CREATE TABLE contractors (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    vendor BOOLEAN NOT NULL DEFAULT FALSE,
    customer BOOLEAN NOT NULL DEFAULT FALSE,
    enabled BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    external_id BIGINT UNIQUE,
    contractor_id UUID NOT NULL REFERENCES contractors(id),
    name TEXT NOT NULL UNIQUE,
    balance NUMERIC NOT NULL DEFAULT 0,
    min_balance NUMERIC NOT NULL DEFAULT 0,
    max_balance NUMERIC NOT NULL DEFAULT 0,
    vat NUMERIC NOT NULL DEFAULT 0,
    destination_rate_limit NUMERIC,
    max_call_duration INTEGER,
    origination_capacity SMALLINT,
    termination_capacity SMALLINT,
    total_capacity SMALLINT,
    timezone TEXT NOT NULL DEFAULT 'UTC',
    customer_invoice_period invoice_period_kind,
    vendor_invoice_period invoice_period_kind,
    next_customer_invoice_at TIMESTAMPTZ,
    next_vendor_invoice_at TIMESTAMPTZ,
    customer_invoice_ref_template TEXT NOT NULL DEFAULT '$id',
    vendor_invoice_ref_template TEXT NOT NULL DEFAULT '$id',
    send_invoices_to TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT accounts_balance_bounds CHECK (max_balance >= min_balance),
    CONSTRAINT accounts_vat_percent CHECK (vat >= 0 AND vat <= 100),
    CONSTRAINT accounts_max_call_duration_positive
        CHECK (max_call_duration IS NULL OR max_call_duration > 0)
);

CREATE INDEX accounts_contractor_id_idx ON accounts(contractor_id);
CREATE INDEX accounts_next_customer_invoice_at_idx
    ON accounts(next_customer_invoice_at)
    WHERE customer_invoice_period IS NOT NULL;
CREATE INDEX accounts_next_vendor_invoice_at_idx
    ON accounts(next_vendor_invoice_at)
    WHERE vendor_invoice_period IS NOT NULL;
";

const BALANCE_NOTIFICATION_SETTINGS_SQL: &str = r"
CREATE TABLE balance_notification_settings (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL UNIQUE REFERENCES accounts(id) ON DELETE CASCADE,
    state balance_threshold_state NOT NULL DEFAULT 'none',
    low_threshold NUMERIC,
    high_threshold NUMERIC,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    uuid UUID NOT NULL UNIQUE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    contractor_id UUID NOT NULL REFERENCES contractors(id),
    direction invoice_direction NOT NULL,
    state invoice_state NOT NULL DEFAULT 'new',
    start_date TIMESTAMPTZ NOT NULL,
    end_date TIMESTAMPTZ NOT NULL,
    amount NUMERIC NOT NULL DEFAULT 0,
    calls_count BIGINT NOT NULL DEFAULT 0,
    calls_duration BIGINT NOT NULL DEFAULT 0,
    billing_duration BIGINT NOT NULL DEFAULT 0,
    successful_calls_count BIGINT,
    first_call_at TIMESTAMPTZ,
    last_call_at TIMESTAMPTZ,
    first_successful_call_at TIMESTAMPTZ,
    last_successful_call_at TIMESTAMPTZ,
    reference TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT invoices_date_order CHECK (start_date < end_date),
    CONSTRAINT invoices_amount_non_negative CHECK (amount >= 0)
);

CREATE INDEX invoices_account_id_idx ON invoices(account_id);
CREATE INDEX invoices_reference_idx ON invoices(reference);
CREATE INDEX invoices_account_direction_end_date_idx
    ON invoices(account_id, direction, end_date DESC);
";

const INVOICE_NOTIFICATIONS_SQL: &str = r"
CREATE TABLE invoice_notifications (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    recipients TEXT NOT NULL,
    state delivery_state NOT NULL DEFAULT 'queued',
    attempts INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    queued_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    delivered_at TIMESTAMPTZ
);

CREATE INDEX invoice_notifications_queued_idx
    ON invoice_notifications(queued_at)
    WHERE state = 'queued';
";

const CUSTOMER_AUTHS_SQL: &str = r"
CREATE TABLE customer_auths (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    external_id BIGINT,
    external_type TEXT,
    enabled BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX customer_auths_account_id_idx ON customer_auths(account_id);
";

const CUSTOMER_AUTH_STATS_SQL: &str = r"
CREATE TABLE customer_auth_stats (
    id UUID PRIMARY KEY,
    customer_auth_id UUID NOT NULL REFERENCES customer_auths(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    timestamp TIMESTAMPTZ NOT NULL,
    customer_price NUMERIC NOT NULL DEFAULT 0,
    calls_count BIGINT NOT NULL DEFAULT 0,
    calls_duration BIGINT NOT NULL DEFAULT 0
);

CREATE INDEX customer_auth_stats_timestamp_idx ON customer_auth_stats(timestamp);
CREATE INDEX customer_auth_stats_auth_idx ON customer_auth_stats(customer_auth_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS customer_auth_stats;
DROP TABLE IF EXISTS customer_auths;
DROP TABLE IF EXISTS invoice_notifications;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS balance_notification_settings;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS contractors;

DROP TYPE IF EXISTS delivery_state;
DROP TYPE IF EXISTS balance_threshold_state;
DROP TYPE IF EXISTS invoice_period_kind;
DROP TYPE IF EXISTS invoice_direction;
DROP TYPE IF EXISTS invoice_state;
";
