//! Database seeder for Ledgerline development and testing.
//!
//! Seeds a test organization, usage meter, subscription, ledger account, an
//! active billing period that has already ended, and two usage-credit grants
//! (one expiring at the period boundary, one evergreen) so a billing run has
//! something to transition.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use ledgerline_core::ledger::UsageCreditGrant;
use ledgerline_db::entities::{
    billing_periods, ledger_accounts, organizations, sea_orm_active_enums::BillingPeriodStatus,
    subscriptions, usage_meters,
};
use ledgerline_db::repositories::LedgerRepository;
use ledgerline_shared::types::{OrganizationId, SubscriptionId, UsageCreditId, UsageMeterId};

/// Test organization ID (consistent for all seeds)
const TEST_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test usage meter ID (consistent for all seeds)
const TEST_METER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Test subscription ID (consistent for all seeds)
const TEST_SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Test ledger account ID (consistent for all seeds)
const TEST_ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000004";
/// Test billing period ID (consistent for all seeds)
const TEST_PERIOD_ID: &str = "00000000-0000-0000-0000-000000000005";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = ledgerline_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test organization...");
    seed_organization(&db).await;

    println!("Seeding test usage meter...");
    seed_usage_meter(&db).await;

    println!("Seeding test subscription...");
    seed_subscription(&db).await;

    println!("Seeding test ledger account...");
    seed_ledger_account(&db).await;

    println!("Seeding elapsed billing period...");
    seed_billing_period(&db).await;

    println!("Seeding usage-credit grants...");
    seed_grants(&db).await;

    println!("Seeding complete!");
}

fn fixed_id(id: &str) -> Uuid {
    Uuid::parse_str(id).unwrap()
}

async fn seed_organization(db: &DatabaseConnection) {
    if organizations::Entity::find_by_id(fixed_id(TEST_ORG_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test organization already exists, skipping...");
        return;
    }

    let now = Utc::now();
    organizations::ActiveModel {
        id: Set(fixed_id(TEST_ORG_ID)),
        name: Set("Ledgerline Test Org".to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed organization");
}

async fn seed_usage_meter(db: &DatabaseConnection) {
    if usage_meters::Entity::find_by_id(fixed_id(TEST_METER_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test usage meter already exists, skipping...");
        return;
    }

    let now = Utc::now();
    usage_meters::ActiveModel {
        id: Set(fixed_id(TEST_METER_ID)),
        organization_id: Set(fixed_id(TEST_ORG_ID)),
        name: Set("api_calls".to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed usage meter");
}

async fn seed_subscription(db: &DatabaseConnection) {
    if subscriptions::Entity::find_by_id(fixed_id(TEST_SUBSCRIPTION_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test subscription already exists, skipping...");
        return;
    }

    let now = Utc::now();
    subscriptions::ActiveModel {
        id: Set(fixed_id(TEST_SUBSCRIPTION_ID)),
        organization_id: Set(fixed_id(TEST_ORG_ID)),
        livemode: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed subscription");
}

async fn seed_ledger_account(db: &DatabaseConnection) {
    if ledger_accounts::Entity::find_by_id(fixed_id(TEST_ACCOUNT_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test ledger account already exists, skipping...");
        return;
    }

    let now = Utc::now();
    ledger_accounts::ActiveModel {
        id: Set(fixed_id(TEST_ACCOUNT_ID)),
        organization_id: Set(fixed_id(TEST_ORG_ID)),
        subscription_id: Set(fixed_id(TEST_SUBSCRIPTION_ID)),
        usage_meter_id: Set(fixed_id(TEST_METER_ID)),
        livemode: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed ledger account");
}

/// Seeds an active billing period that ended an hour ago, so the next
/// billing run picks it up immediately.
async fn seed_billing_period(db: &DatabaseConnection) {
    if billing_periods::Entity::find_by_id(fixed_id(TEST_PERIOD_ID))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Test billing period already exists, skipping...");
        return;
    }

    let now = Utc::now();
    let end = now - Duration::hours(1);
    let start = end - Duration::days(30);
    billing_periods::ActiveModel {
        id: Set(fixed_id(TEST_PERIOD_ID)),
        subscription_id: Set(fixed_id(TEST_SUBSCRIPTION_ID)),
        start_date: Set(start.into()),
        end_date: Set(end.into()),
        status: Set(BillingPeriodStatus::Active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed billing period");
}

/// Issues two grants through the ledger repository so their recognition
/// entries are written the same way production grants are.
async fn seed_grants(db: &DatabaseConnection) {
    let ledger = LedgerRepository::new(db.clone());
    let period_end = Utc::now() - Duration::hours(1);

    let expiring = UsageCreditGrant {
        id: UsageCreditId::new(),
        subscription_id: SubscriptionId::from_uuid(fixed_id(TEST_SUBSCRIPTION_ID)),
        usage_meter_id: UsageMeterId::from_uuid(fixed_id(TEST_METER_ID)),
        issued_amount: 10_000,
        expires_at: Some(period_end),
        livemode: false,
    };
    ledger
        .issue_credit(
            OrganizationId::from_uuid(fixed_id(TEST_ORG_ID)),
            &expiring,
        )
        .await
        .expect("Failed to seed expiring grant");

    let evergreen = UsageCreditGrant {
        id: UsageCreditId::new(),
        subscription_id: SubscriptionId::from_uuid(fixed_id(TEST_SUBSCRIPTION_ID)),
        usage_meter_id: UsageMeterId::from_uuid(fixed_id(TEST_METER_ID)),
        issued_amount: 5_000,
        expires_at: None,
        livemode: false,
    };
    ledger
        .issue_credit(
            OrganizationId::from_uuid(fixed_id(TEST_ORG_ID)),
            &evergreen,
        )
        .await
        .expect("Failed to seed evergreen grant");
}
