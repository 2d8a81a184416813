//! Conversions between `SeaORM` entity models and the domain types in
//! `ledgerline-core`.
//!
//! Domain code never sees entity models; every read maps into a domain
//! value here, and every write maps back into an `ActiveModel`.

use chrono::Utc;
use sea_orm::Set;
use serde_json::Value;

use ledgerline_core::ledger::{
    BillingPeriod, BillingPeriodStatus, LedgerAccount, LedgerEntryDirection, LedgerEntryRecord,
    LedgerEntryStatus, LedgerEntryType, LedgerTransaction, LedgerTransactionType, UsageCreditGrant,
};
use ledgerline_shared::types::{
    BillingPeriodId, LedgerAccountId, LedgerEntryId, LedgerTransactionId, OrganizationId,
    SubscriptionId, UsageCreditId, UsageMeterId,
};

use crate::entities::{
    billing_periods, ledger_accounts, ledger_entries, ledger_transactions, sea_orm_active_enums,
    usage_credits,
};

pub(crate) fn account_from_model(model: ledger_accounts::Model) -> LedgerAccount {
    LedgerAccount {
        id: LedgerAccountId::from_uuid(model.id),
        subscription_id: SubscriptionId::from_uuid(model.subscription_id),
        usage_meter_id: UsageMeterId::from_uuid(model.usage_meter_id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        livemode: model.livemode,
    }
}

pub(crate) fn grant_from_model(model: usage_credits::Model) -> UsageCreditGrant {
    UsageCreditGrant {
        id: UsageCreditId::from_uuid(model.id),
        subscription_id: SubscriptionId::from_uuid(model.subscription_id),
        usage_meter_id: UsageMeterId::from_uuid(model.usage_meter_id),
        issued_amount: model.issued_amount,
        expires_at: model.expires_at.map(|at| at.with_timezone(&Utc)),
        livemode: model.livemode,
    }
}

pub(crate) fn period_from_model(model: billing_periods::Model) -> BillingPeriod {
    BillingPeriod {
        id: BillingPeriodId::from_uuid(model.id),
        subscription_id: SubscriptionId::from_uuid(model.subscription_id),
        start_date: model.start_date.with_timezone(&Utc),
        end_date: model.end_date.with_timezone(&Utc),
        status: period_status_from_db(&model.status),
    }
}

pub(crate) fn entry_from_model(model: ledger_entries::Model) -> LedgerEntryRecord {
    LedgerEntryRecord {
        id: LedgerEntryId::from_uuid(model.id),
        ledger_transaction_id: LedgerTransactionId::from_uuid(model.ledger_transaction_id),
        ledger_account_id: LedgerAccountId::from_uuid(model.ledger_account_id),
        subscription_id: SubscriptionId::from_uuid(model.subscription_id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        usage_meter_id: UsageMeterId::from_uuid(model.usage_meter_id),
        entry_type: entry_type_from_db(&model.entry_type),
        direction: entry_direction_from_db(&model.direction),
        amount: model.amount,
        status: entry_status_from_db(&model.status),
        entry_timestamp: model.entry_timestamp.with_timezone(&Utc),
        metadata: model
            .metadata
            .as_object()
            .cloned()
            .unwrap_or_default(),
        source_usage_credit_id: model.source_usage_credit_id.map(UsageCreditId::from_uuid),
        livemode: model.livemode,
        description: model.description,
    }
}

pub(crate) fn entry_to_active_model(entry: &LedgerEntryRecord) -> ledger_entries::ActiveModel {
    ledger_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        ledger_transaction_id: Set(entry.ledger_transaction_id.into_inner()),
        ledger_account_id: Set(entry.ledger_account_id.into_inner()),
        subscription_id: Set(entry.subscription_id.into_inner()),
        organization_id: Set(entry.organization_id.into_inner()),
        usage_meter_id: Set(entry.usage_meter_id.into_inner()),
        entry_type: Set(entry_type_to_db(entry.entry_type)),
        direction: Set(entry_direction_to_db(entry.direction)),
        amount: Set(entry.amount),
        status: Set(entry_status_to_db(entry.status)),
        entry_timestamp: Set(entry.entry_timestamp.into()),
        metadata: Set(Value::Object(entry.metadata.clone())),
        source_usage_credit_id: Set(entry.source_usage_credit_id.map(UsageCreditId::into_inner)),
        livemode: Set(entry.livemode),
        description: Set(entry.description.clone()),
        created_at: Set(Utc::now().into()),
    }
}

pub(crate) fn transaction_to_active_model(
    transaction: &LedgerTransaction,
) -> ledger_transactions::ActiveModel {
    ledger_transactions::ActiveModel {
        id: Set(transaction.id.into_inner()),
        organization_id: Set(transaction.organization_id.into_inner()),
        subscription_id: Set(transaction.subscription_id.into_inner()),
        transaction_type: Set(transaction_type_to_db(transaction.transaction_type)),
        livemode: Set(transaction.livemode),
        description: Set(transaction.description.clone()),
        metadata: Set(Value::Object(transaction.metadata.clone())),
        created_at: Set(transaction.created_at.into()),
    }
}

pub(crate) fn entry_direction_from_db(
    direction: &sea_orm_active_enums::LedgerEntryDirection,
) -> LedgerEntryDirection {
    match direction {
        sea_orm_active_enums::LedgerEntryDirection::Credit => LedgerEntryDirection::Credit,
        sea_orm_active_enums::LedgerEntryDirection::Debit => LedgerEntryDirection::Debit,
    }
}

pub(crate) fn entry_direction_to_db(
    direction: LedgerEntryDirection,
) -> sea_orm_active_enums::LedgerEntryDirection {
    match direction {
        LedgerEntryDirection::Credit => sea_orm_active_enums::LedgerEntryDirection::Credit,
        LedgerEntryDirection::Debit => sea_orm_active_enums::LedgerEntryDirection::Debit,
    }
}

pub(crate) fn entry_type_from_db(
    entry_type: &sea_orm_active_enums::LedgerEntryType,
) -> LedgerEntryType {
    match entry_type {
        sea_orm_active_enums::LedgerEntryType::GrantRecognized => LedgerEntryType::GrantRecognized,
        sea_orm_active_enums::LedgerEntryType::UsageDebit => LedgerEntryType::UsageDebit,
        sea_orm_active_enums::LedgerEntryType::CreditApplied => LedgerEntryType::CreditApplied,
        sea_orm_active_enums::LedgerEntryType::CreditAppliedToUsage => {
            LedgerEntryType::CreditAppliedToUsage
        }
        sea_orm_active_enums::LedgerEntryType::GrantExpired => LedgerEntryType::GrantExpired,
    }
}

pub(crate) fn entry_type_to_db(
    entry_type: LedgerEntryType,
) -> sea_orm_active_enums::LedgerEntryType {
    match entry_type {
        LedgerEntryType::GrantRecognized => sea_orm_active_enums::LedgerEntryType::GrantRecognized,
        LedgerEntryType::UsageDebit => sea_orm_active_enums::LedgerEntryType::UsageDebit,
        LedgerEntryType::CreditApplied => sea_orm_active_enums::LedgerEntryType::CreditApplied,
        LedgerEntryType::CreditAppliedToUsage => {
            sea_orm_active_enums::LedgerEntryType::CreditAppliedToUsage
        }
        LedgerEntryType::GrantExpired => sea_orm_active_enums::LedgerEntryType::GrantExpired,
    }
}

pub(crate) fn entry_status_from_db(
    status: &sea_orm_active_enums::LedgerEntryStatus,
) -> LedgerEntryStatus {
    match status {
        sea_orm_active_enums::LedgerEntryStatus::Pending => LedgerEntryStatus::Pending,
        sea_orm_active_enums::LedgerEntryStatus::Posted => LedgerEntryStatus::Posted,
    }
}

pub(crate) fn entry_status_to_db(
    status: LedgerEntryStatus,
) -> sea_orm_active_enums::LedgerEntryStatus {
    match status {
        LedgerEntryStatus::Pending => sea_orm_active_enums::LedgerEntryStatus::Pending,
        LedgerEntryStatus::Posted => sea_orm_active_enums::LedgerEntryStatus::Posted,
    }
}

pub(crate) fn transaction_type_to_db(
    transaction_type: LedgerTransactionType,
) -> sea_orm_active_enums::LedgerTransactionType {
    match transaction_type {
        LedgerTransactionType::BillingPeriodTransition => {
            sea_orm_active_enums::LedgerTransactionType::BillingPeriodTransition
        }
        LedgerTransactionType::UsageEventProcessed => {
            sea_orm_active_enums::LedgerTransactionType::UsageEventProcessed
        }
        LedgerTransactionType::CreditGrantRecognized => {
            sea_orm_active_enums::LedgerTransactionType::CreditGrantRecognized
        }
        LedgerTransactionType::AdminCreditAdjusted => {
            sea_orm_active_enums::LedgerTransactionType::AdminCreditAdjusted
        }
    }
}

pub(crate) fn period_status_from_db(
    status: &sea_orm_active_enums::BillingPeriodStatus,
) -> BillingPeriodStatus {
    match status {
        sea_orm_active_enums::BillingPeriodStatus::Upcoming => BillingPeriodStatus::Upcoming,
        sea_orm_active_enums::BillingPeriodStatus::Active => BillingPeriodStatus::Active,
        sea_orm_active_enums::BillingPeriodStatus::Completed => BillingPeriodStatus::Completed,
    }
}

pub(crate) fn period_status_to_db(
    status: BillingPeriodStatus,
) -> sea_orm_active_enums::BillingPeriodStatus {
    match status {
        BillingPeriodStatus::Upcoming => sea_orm_active_enums::BillingPeriodStatus::Upcoming,
        BillingPeriodStatus::Active => sea_orm_active_enums::BillingPeriodStatus::Active,
        BillingPeriodStatus::Completed => sea_orm_active_enums::BillingPeriodStatus::Completed,
    }
}
