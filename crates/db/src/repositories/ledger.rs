//! Ledger repository for account, grant, and entry database operations.
//!
//! Balance aggregation lives here: grants and entries are queried per
//! account and folded through the pure aggregation in `ledgerline-core`.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use ledgerline_core::ledger::{
    available_balances, GrantBalance, LedgerAccount, LedgerEntryRecord, LedgerError,
    LedgerTransaction, UsageCreditGrant,
};
use ledgerline_shared::types::{
    LedgerAccountId, LedgerTransactionId, OrganizationId, SubscriptionId, UsageMeterId,
};

use crate::entities::{ledger_accounts, ledger_entries, usage_credits};

use super::convert;
use super::convert::{entry_from_model, entry_to_active_model, transaction_to_active_model};

/// Error types for ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerStoreError {
    /// Ledger account not found.
    #[error("Ledger account not found: {0}")]
    AccountNotFound(Uuid),

    /// Domain rule violation from `ledgerline-core`.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Ledger repository for account, grant, and entry operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the subscription's ledger accounts, oldest first.
    pub async fn accounts_for_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
        accounts_for_subscription_on(&self.db, subscription_id).await
    }

    /// Same as [`Self::accounts_for_subscription`] but inside a transaction,
    /// so the account list is consistent with the entries about to be read.
    pub async fn accounts_for_subscription_tx(
        &self,
        txn: &DatabaseTransaction,
        subscription_id: SubscriptionId,
    ) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
        accounts_for_subscription_on(txn, subscription_id).await
    }

    /// Lists the posted-or-pending entries recorded against one account,
    /// oldest first.
    pub async fn entries_for_account(
        &self,
        ledger_account_id: LedgerAccountId,
    ) -> Result<Vec<LedgerEntryRecord>, LedgerStoreError> {
        entries_for_account_on(&self.db, ledger_account_id).await
    }

    /// Aggregates per-grant available balances for one ledger account.
    ///
    /// This is the balance-aggregation collaborator consumed by the credit
    /// expiration calculation: grants on the account's meter are loaded with
    /// every entry posted against the account, then folded through the pure
    /// aggregation in core.
    pub async fn grant_balances(
        &self,
        txn: &DatabaseTransaction,
        account: &LedgerAccount,
    ) -> Result<Vec<GrantBalance>, LedgerStoreError> {
        let grant_models = usage_credits::Entity::find()
            .filter(usage_credits::Column::SubscriptionId.eq(account.subscription_id.into_inner()))
            .filter(usage_credits::Column::UsageMeterId.eq(account.usage_meter_id.into_inner()))
            .order_by_asc(usage_credits::Column::CreatedAt)
            .all(txn)
            .await?;

        let grants: Vec<UsageCreditGrant> =
            grant_models.into_iter().map(convert::grant_from_model).collect();
        let entries = entries_for_account_on(txn, account.id).await?;

        Ok(available_balances(&grants, &entries))
    }

    /// Inserts the container transaction record.
    pub async fn insert_transaction(
        &self,
        txn: &DatabaseTransaction,
        transaction: &LedgerTransaction,
    ) -> Result<(), LedgerStoreError> {
        transaction_to_active_model(transaction).insert(txn).await?;
        Ok(())
    }

    /// Inserts ledger entries through the standard insert path.
    pub async fn insert_entries(
        &self,
        txn: &DatabaseTransaction,
        entries: &[LedgerEntryRecord],
    ) -> Result<(), LedgerStoreError> {
        for entry in entries {
            entry_to_active_model(entry).insert(txn).await?;
        }
        Ok(())
    }

    /// Issues a usage-credit grant and recognizes it on its ledger account,
    /// all within one database transaction.
    pub async fn issue_credit(
        &self,
        organization_id: OrganizationId,
        grant: &UsageCreditGrant,
    ) -> Result<LedgerTransactionId, LedgerStoreError> {
        let txn = self.db.begin().await?;

        let account = find_account_for_meter(
            &txn,
            grant.subscription_id,
            grant.usage_meter_id,
        )
        .await?;

        let now = Utc::now();
        let transaction = LedgerTransaction {
            id: LedgerTransactionId::new(),
            transaction_type: ledgerline_core::ledger::LedgerTransactionType::CreditGrantRecognized,
            organization_id,
            subscription_id: grant.subscription_id,
            livemode: grant.livemode,
            description: Some(format!("Recognize usage credit grant {}", grant.id)),
            metadata: serde_json::Map::new(),
            created_at: now,
        };

        usage_credits::ActiveModel {
            id: Set(grant.id.into_inner()),
            organization_id: Set(organization_id.into_inner()),
            subscription_id: Set(grant.subscription_id.into_inner()),
            usage_meter_id: Set(grant.usage_meter_id.into_inner()),
            issued_amount: Set(grant.issued_amount),
            expires_at: Set(grant.expires_at.map(Into::into)),
            livemode: Set(grant.livemode),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        self.insert_transaction(&txn, &transaction).await?;
        let entry = grant.recognition_entry(&account, &transaction);
        self.insert_entries(&txn, std::slice::from_ref(&entry)).await?;

        txn.commit().await?;
        Ok(transaction.id)
    }

    /// Records a metered usage event against one account, drawing down its
    /// outstanding grants, all within one database transaction.
    pub async fn record_usage(
        &self,
        ledger_account_id: LedgerAccountId,
        usage_amount: i64,
    ) -> Result<LedgerTransactionId, LedgerStoreError> {
        let txn = self.db.begin().await?;

        let account_model = ledger_accounts::Entity::find_by_id(ledger_account_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerStoreError::AccountNotFound(
                ledger_account_id.into_inner(),
            ))?;
        let account = convert::account_from_model(account_model);

        let transaction = LedgerTransaction {
            id: LedgerTransactionId::new(),
            transaction_type: ledgerline_core::ledger::LedgerTransactionType::UsageEventProcessed,
            organization_id: account.organization_id,
            subscription_id: account.subscription_id,
            livemode: account.livemode,
            description: Some(format!("Usage event on meter {}", account.usage_meter_id)),
            metadata: serde_json::Map::new(),
            created_at: Utc::now(),
        };

        let balances = self.grant_balances(&txn, &account).await?;
        let entries =
            ledgerline_core::ledger::draw_down_usage(&account, &transaction, usage_amount, &balances)?;

        self.insert_transaction(&txn, &transaction).await?;
        self.insert_entries(&txn, &entries).await?;

        txn.commit().await?;
        Ok(transaction.id)
    }
}

/// Finds the account for a (subscription, usage meter) pair.
async fn find_account_for_meter(
    txn: &DatabaseTransaction,
    subscription_id: SubscriptionId,
    usage_meter_id: UsageMeterId,
) -> Result<LedgerAccount, LedgerStoreError> {
    let model = ledger_accounts::Entity::find()
        .filter(ledger_accounts::Column::SubscriptionId.eq(subscription_id.into_inner()))
        .filter(ledger_accounts::Column::UsageMeterId.eq(usage_meter_id.into_inner()))
        .one(txn)
        .await?
        .ok_or(LedgerStoreError::AccountNotFound(usage_meter_id.into_inner()))?;
    Ok(convert::account_from_model(model))
}

async fn accounts_for_subscription_on<C: ConnectionTrait>(
    conn: &C,
    subscription_id: SubscriptionId,
) -> Result<Vec<LedgerAccount>, LedgerStoreError> {
    let models = ledger_accounts::Entity::find()
        .filter(ledger_accounts::Column::SubscriptionId.eq(subscription_id.into_inner()))
        .order_by_asc(ledger_accounts::Column::CreatedAt)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(convert::account_from_model).collect())
}

async fn entries_for_account_on<C: ConnectionTrait>(
    conn: &C,
    ledger_account_id: LedgerAccountId,
) -> Result<Vec<LedgerEntryRecord>, LedgerStoreError> {
    let models = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::LedgerAccountId.eq(ledger_account_id.into_inner()))
        .order_by_asc(ledger_entries::Column::EntryTimestamp)
        .all(conn)
        .await?;
    Ok(models.into_iter().map(entry_from_model).collect())
}
