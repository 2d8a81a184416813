//! `SeaORM` active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "ledger_entry_direction"
)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryDirection {
    /// Credit entry.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Debit entry.
    #[sea_orm(string_value = "debit")]
    Debit,
}

/// Classification of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_entry_type")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryType {
    /// Credit recognizing a newly issued usage-credit grant.
    #[sea_orm(string_value = "grant_recognized")]
    GrantRecognized,
    /// Debit recording metered usage cost.
    #[sea_orm(string_value = "usage_debit")]
    UsageDebit,
    /// Debit consuming part of a grant's balance.
    #[sea_orm(string_value = "credit_applied")]
    CreditApplied,
    /// Informational credit toward usage cost.
    #[sea_orm(string_value = "credit_applied_to_usage")]
    CreditAppliedToUsage,
    /// Debit forfeiting a grant's unconsumed remainder.
    #[sea_orm(string_value = "grant_expired")]
    GrantExpired,
}

/// Posting status of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_entry_status")]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryStatus {
    /// Provisional entry, excluded from balance aggregation.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Final, immutable entry.
    #[sea_orm(string_value = "posted")]
    Posted,
}

/// What initiated a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "ledger_transaction_type"
)]
#[serde(rename_all = "snake_case")]
pub enum LedgerTransactionType {
    /// Scheduled billing-period boundary.
    #[sea_orm(string_value = "billing_period_transition")]
    BillingPeriodTransition,
    /// A metered usage event was processed.
    #[sea_orm(string_value = "usage_event_processed")]
    UsageEventProcessed,
    /// A usage-credit grant was issued and recognized.
    #[sea_orm(string_value = "credit_grant_recognized")]
    CreditGrantRecognized,
    /// Manual balance correction.
    #[sea_orm(string_value = "admin_credit_adjusted")]
    AdminCreditAdjusted,
}

/// Billing period lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "billing_period_status"
)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriodStatus {
    /// Period has not started yet.
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    /// Period is the subscription's current cycle.
    #[sea_orm(string_value = "active")]
    Active,
    /// Period has been closed by a transition.
    #[sea_orm(string_value = "completed")]
    Completed,
}
