//! Initial database migration.
//!
//! Creates the enums and tables for the usage-credit ledger: tenancy
//! (organizations, usage meters, subscriptions), billing periods, ledger
//! accounts, usage-credit grants, and the append-only ledger itself.

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
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(USAGE_METERS_SQL).await?;
        db.execute_unprepared(SUBSCRIPTIONS_SQL).await?;

        // ============================================================
        // PART 3: BILLING PERIODS
        // ============================================================
        db.execute_unprepared(BILLING_PERIODS_SQL).await?;

        // ============================================================
        // PART 4: LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ACCOUNTS_SQL).await?;
        db.execute_unprepared(USAGE_CREDITS_SQL).await?;
        db.execute_unprepared(LEDGER_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

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
-- Ledger entry direction
CREATE TYPE ledger_entry_direction AS ENUM (
    'credit',
    'debit'
);

-- Ledger entry classification
CREATE TYPE ledger_entry_type AS ENUM (
    'grant_recognized',
    'usage_debit',
    'credit_applied',
    'credit_applied_to_usage',
    'grant_expired'
);

-- Ledger entry posting status
CREATE TYPE ledger_entry_status AS ENUM (
    'pending',
    'posted'
);

-- What initiated a ledger transaction
CREATE TYPE ledger_transaction_type AS ENUM (
    'billing_period_transition',
    'usage_event_processed',
    'credit_grant_recognized',
    'admin_credit_adjusted'
);

-- Billing period lifecycle status
CREATE TYPE billing_period_status AS ENUM (
    'upcoming',
    'active',
    'completed'
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const USAGE_METERS_SQL: &str = r"
CREATE TABLE usage_meters (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (organization_id, name)
);
";

const SUBSCRIPTIONS_SQL: &str = r"
CREATE TABLE subscriptions (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    livemode BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_subscriptions_organization ON subscriptions(organization_id);
";

const BILLING_PERIODS_SQL: &str = r"
CREATE TABLE billing_periods (
    id UUID PRIMARY KEY,
    subscription_id UUID NOT NULL REFERENCES subscriptions(id),
    start_date TIMESTAMPTZ NOT NULL,
    end_date TIMESTAMPTZ NOT NULL,
    status billing_period_status NOT NULL DEFAULT 'upcoming',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (end_date > start_date)
);

CREATE INDEX idx_billing_periods_subscription ON billing_periods(subscription_id);
CREATE INDEX idx_billing_periods_due ON billing_periods(status, end_date);
";

const LEDGER_ACCOUNTS_SQL: &str = r"
CREATE TABLE ledger_accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    subscription_id UUID NOT NULL REFERENCES subscriptions(id),
    usage_meter_id UUID NOT NULL REFERENCES usage_meters(id),
    livemode BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (subscription_id, usage_meter_id)
);

CREATE INDEX idx_ledger_accounts_subscription ON ledger_accounts(subscription_id);
";

const USAGE_CREDITS_SQL: &str = r"
CREATE TABLE usage_credits (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    subscription_id UUID NOT NULL REFERENCES subscriptions(id),
    usage_meter_id UUID NOT NULL REFERENCES usage_meters(id),
    issued_amount BIGINT NOT NULL CHECK (issued_amount >= 0),
    expires_at TIMESTAMPTZ,
    livemode BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_usage_credits_subscription_meter
    ON usage_credits(subscription_id, usage_meter_id);
CREATE INDEX idx_usage_credits_expires_at ON usage_credits(expires_at);
";

const LEDGER_TRANSACTIONS_SQL: &str = r"
CREATE TABLE ledger_transactions (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    subscription_id UUID NOT NULL REFERENCES subscriptions(id),
    transaction_type ledger_transaction_type NOT NULL,
    livemode BOOLEAN NOT NULL DEFAULT TRUE,
    description TEXT,
    metadata JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledger_transactions_subscription
    ON ledger_transactions(subscription_id);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    ledger_transaction_id UUID NOT NULL REFERENCES ledger_transactions(id),
    ledger_account_id UUID NOT NULL REFERENCES ledger_accounts(id),
    subscription_id UUID NOT NULL REFERENCES subscriptions(id),
    organization_id UUID NOT NULL REFERENCES organizations(id),
    usage_meter_id UUID NOT NULL REFERENCES usage_meters(id),
    entry_type ledger_entry_type NOT NULL,
    direction ledger_entry_direction NOT NULL,
    amount BIGINT NOT NULL CHECK (amount >= 0),
    status ledger_entry_status NOT NULL DEFAULT 'posted',
    entry_timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    metadata JSONB NOT NULL DEFAULT '{}',
    source_usage_credit_id UUID REFERENCES usage_credits(id),
    livemode BOOLEAN NOT NULL DEFAULT TRUE,
    description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledger_entries_account ON ledger_entries(ledger_account_id);
CREATE INDEX idx_ledger_entries_transaction ON ledger_entries(ledger_transaction_id);
CREATE INDEX idx_ledger_entries_source_credit
    ON ledger_entries(source_usage_credit_id)
    WHERE source_usage_credit_id IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS ledger_transactions CASCADE;
DROP TABLE IF EXISTS usage_credits CASCADE;
DROP TABLE IF EXISTS ledger_accounts CASCADE;
DROP TABLE IF EXISTS billing_periods CASCADE;
DROP TABLE IF EXISTS subscriptions CASCADE;
DROP TABLE IF EXISTS usage_meters CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;

DROP TYPE IF EXISTS billing_period_status;
DROP TYPE IF EXISTS ledger_transaction_type;
DROP TYPE IF EXISTS ledger_entry_status;
DROP TYPE IF EXISTS ledger_entry_type;
DROP TYPE IF EXISTS ledger_entry_direction;
";
