//! `SeaORM` Entity for ledger_entries table.
//!
//! Append-only: posted rows are never updated; corrections are new rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{LedgerEntryDirection, LedgerEntryStatus, LedgerEntryType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ledger_transaction_id: Uuid,
    pub ledger_account_id: Uuid,
    pub subscription_id: Uuid,
    pub organization_id: Uuid,
    pub usage_meter_id: Uuid,
    pub entry_type: LedgerEntryType,
    pub direction: LedgerEntryDirection,
    pub amount: i64,
    pub status: LedgerEntryStatus,
    pub entry_timestamp: DateTimeWithTimeZone,
    pub metadata: Json,
    pub source_usage_credit_id: Option<Uuid>,
    pub livemode: bool,
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_transactions::Entity",
        from = "Column::LedgerTransactionId",
        to = "super::ledger_transactions::Column::Id"
    )]
    LedgerTransactions,
    #[sea_orm(
        belongs_to = "super::ledger_accounts::Entity",
        from = "Column::LedgerAccountId",
        to = "super::ledger_accounts::Column::Id"
    )]
    LedgerAccounts,
    #[sea_orm(
        belongs_to = "super::usage_credits::Entity",
        from = "Column::SourceUsageCreditId",
        to = "super::usage_credits::Column::Id"
    )]
    UsageCredits,
}

impl Related<super::ledger_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerTransactions.def()
    }
}

impl Related<super::ledger_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerAccounts.def()
    }
}

impl Related<super::usage_credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageCredits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
