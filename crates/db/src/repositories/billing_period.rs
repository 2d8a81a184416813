//! Billing-period repository and transition orchestration.
//!
//! `run_transition` performs the whole period boundary inside one database
//! transaction: the credit-expiration calculation stays pure in
//! `ledgerline-core`; this repository feeds it prefetched balances and
//! persists what it returns.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use ledgerline_core::ledger::{
    expire_credits_at_period_end, BillingPeriod, BillingPeriodStatus,
    BillingPeriodTransitionCommand, ExpireCreditsInput, GrantBalance, LedgerError,
    LedgerTransaction, LedgerTransactionType, StandardTransition, TransitionPayload,
};
use ledgerline_shared::error::AppError;
use ledgerline_shared::types::{
    BillingPeriodId, LedgerAccountId, LedgerTransactionId, OrganizationId,
};

use crate::entities::{billing_periods, subscriptions};

use super::convert;
use super::ledger::{LedgerRepository, LedgerStoreError};

/// Error types for billing-period operations.
#[derive(Debug, thiserror::Error)]
pub enum BillingPeriodError {
    /// Billing period not found.
    #[error("Billing period not found: {0}")]
    PeriodNotFound(Uuid),

    /// Subscription not found.
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(Uuid),

    /// The period is not in a state that allows a transition.
    #[error("Billing period {0} is not transitionable")]
    NotTransitionable(Uuid),

    /// Domain rule violation from `ledgerline-core`.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Ledger store failure.
    #[error(transparent)]
    Store(#[from] LedgerStoreError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BillingPeriodError> for AppError {
    fn from(err: BillingPeriodError) -> Self {
        match err {
            BillingPeriodError::PeriodNotFound(id) => Self::NotFound(format!("billing period {id}")),
            BillingPeriodError::SubscriptionNotFound(id) => {
                Self::NotFound(format!("subscription {id}"))
            }
            BillingPeriodError::NotTransitionable(id) => {
                Self::BusinessRule(format!("billing period {id} is not transitionable"))
            }
            BillingPeriodError::Ledger(e) => Self::BusinessRule(e.to_string()),
            BillingPeriodError::Store(e) => match e {
                LedgerStoreError::AccountNotFound(id) => {
                    Self::NotFound(format!("ledger account {id}"))
                }
                LedgerStoreError::Ledger(inner) => Self::BusinessRule(inner.to_string()),
                LedgerStoreError::Database(inner) => Self::Database(inner.to_string()),
            },
            BillingPeriodError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A billing period due for transition, with the tenancy fields the
/// transition command needs.
#[derive(Debug, Clone)]
pub struct DuePeriod {
    /// The active period whose end date has passed.
    pub period: BillingPeriod,
    /// The merchant organization owning the subscription.
    pub organization_id: OrganizationId,
    /// Whether the subscription is live (vs. test) mode.
    pub livemode: bool,
}

/// Summary of one committed billing-period transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The container transaction the expiration entries were written with.
    pub ledger_transaction_id: LedgerTransactionId,
    /// The period opened by this transition.
    pub new_billing_period_id: BillingPeriodId,
    /// Number of `GrantExpired` entries written.
    pub expired_entry_count: usize,
    /// Total amount forfeited across all expired grants.
    pub forfeited_total: i64,
}

/// Billing-period repository and transition runner.
#[derive(Debug, Clone)]
pub struct BillingPeriodRepository {
    db: DatabaseConnection,
    ledger: LedgerRepository,
}

impl BillingPeriodRepository {
    /// Creates a new billing-period repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let ledger = LedgerRepository::new(db.clone());
        Self { db, ledger }
    }

    /// Lists active billing periods whose end date is at or before `now`,
    /// oldest boundary first.
    pub async fn find_due_periods(
        &self,
        now: DateTime<Utc>,
        livemode: bool,
        limit: u64,
    ) -> Result<Vec<DuePeriod>, BillingPeriodError> {
        let rows = billing_periods::Entity::find()
            .find_also_related(subscriptions::Entity)
            .filter(
                billing_periods::Column::Status
                    .eq(convert::period_status_to_db(BillingPeriodStatus::Active)),
            )
            .filter(billing_periods::Column::EndDate.lte(now))
            .filter(subscriptions::Column::Livemode.eq(livemode))
            .order_by_asc(billing_periods::Column::EndDate)
            .limit(limit)
            .all(&self.db)
            .await?;

        let mut due = Vec::with_capacity(rows.len());
        for (period_model, subscription) in rows {
            let subscription = subscription.ok_or(BillingPeriodError::SubscriptionNotFound(
                period_model.subscription_id,
            ))?;
            due.push(DuePeriod {
                period: convert::period_from_model(period_model),
                organization_id: OrganizationId::from_uuid(subscription.organization_id),
                livemode: subscription.livemode,
            });
        }
        Ok(due)
    }

    /// Builds the standard transition command closing `due.period` and
    /// opening a follow-up period of the same length.
    #[must_use]
    pub fn prepare_command(&self, due: &DuePeriod) -> BillingPeriodTransitionCommand {
        let length = due.period.end_date - due.period.start_date;
        let new_billing_period = BillingPeriod {
            id: BillingPeriodId::new(),
            subscription_id: due.period.subscription_id,
            start_date: due.period.end_date,
            end_date: due.period.end_date + length,
            status: BillingPeriodStatus::Upcoming,
        };

        BillingPeriodTransitionCommand {
            organization_id: due.organization_id,
            subscription_id: due.period.subscription_id,
            livemode: due.livemode,
            payload: TransitionPayload::Standard(StandardTransition {
                previous_billing_period: due.period.clone(),
                new_billing_period,
            }),
        }
    }

    /// Runs one billing-period transition inside a single database
    /// transaction.
    ///
    /// Closes the previous period, opens the new one, and writes the
    /// `GrantExpired` entries computed by the pure expiration calculation.
    /// Nothing is visible to other connections until commit, so a failure at
    /// any step leaves the subscription untouched.
    pub async fn run_transition(
        &self,
        command: &BillingPeriodTransitionCommand,
    ) -> Result<TransitionOutcome, BillingPeriodError> {
        let standard = command.payload.standard()?;

        let txn = self.db.begin().await?;

        let previous = self
            .load_transitionable(&txn, standard.previous_billing_period.id)
            .await?;

        let accounts = self
            .ledger
            .accounts_for_subscription_tx(&txn, command.subscription_id)
            .await?;

        // Balances are prefetched here so the computation itself stays
        // synchronous and side-effect free.
        let mut balances: HashMap<LedgerAccountId, Vec<GrantBalance>> =
            HashMap::with_capacity(accounts.len());
        for account in &accounts {
            let account_balances = self.ledger.grant_balances(&txn, account).await?;
            balances.insert(account.id, account_balances);
        }

        let ledger_transaction = LedgerTransaction {
            id: LedgerTransactionId::new(),
            transaction_type: LedgerTransactionType::BillingPeriodTransition,
            organization_id: command.organization_id,
            subscription_id: command.subscription_id,
            livemode: command.livemode,
            description: Some(format!(
                "Billing period transition for subscription {}",
                command.subscription_id
            )),
            metadata: serde_json::Map::new(),
            created_at: Utc::now(),
        };

        let outcome = expire_credits_at_period_end(
            ExpireCreditsInput {
                ledger_accounts: &accounts,
                ledger_transaction,
                command,
            },
            |account| {
                balances
                    .get(&account.id)
                    .cloned()
                    .ok_or(LedgerError::AccountNotFound(account.id))
            },
        )?;

        self.ledger
            .insert_transaction(&txn, &outcome.ledger_transaction)
            .await?;
        self.ledger
            .insert_entries(&txn, &outcome.ledger_entries)
            .await?;

        self.complete_period(&txn, previous).await?;
        self.open_period(&txn, &standard.new_billing_period).await?;

        txn.commit().await?;

        let forfeited_total: i64 = outcome.ledger_entries.iter().map(|e| e.amount).sum();
        info!(
            subscription_id = %command.subscription_id,
            ledger_transaction_id = %outcome.ledger_transaction.id,
            expired_entries = outcome.ledger_entries.len(),
            forfeited_total,
            "Billing period transition committed"
        );

        Ok(TransitionOutcome {
            ledger_transaction_id: outcome.ledger_transaction.id,
            new_billing_period_id: standard.new_billing_period.id,
            expired_entry_count: outcome.ledger_entries.len(),
            forfeited_total,
        })
    }

    /// Loads a billing period by id.
    pub async fn find_period(
        &self,
        id: BillingPeriodId,
    ) -> Result<BillingPeriod, BillingPeriodError> {
        let model = billing_periods::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(BillingPeriodError::PeriodNotFound(id.into_inner()))?;
        Ok(convert::period_from_model(model))
    }

    async fn load_transitionable(
        &self,
        txn: &DatabaseTransaction,
        id: BillingPeriodId,
    ) -> Result<billing_periods::Model, BillingPeriodError> {
        let model = billing_periods::Entity::find_by_id(id.into_inner())
            .one(txn)
            .await?
            .ok_or(BillingPeriodError::PeriodNotFound(id.into_inner()))?;

        if !convert::period_status_from_db(&model.status).is_transitionable() {
            return Err(BillingPeriodError::NotTransitionable(model.id));
        }
        Ok(model)
    }

    async fn complete_period(
        &self,
        txn: &DatabaseTransaction,
        model: billing_periods::Model,
    ) -> Result<(), BillingPeriodError> {
        let mut active: billing_periods::ActiveModel = model.into();
        active.status = Set(convert::period_status_to_db(BillingPeriodStatus::Completed));
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;
        Ok(())
    }

    /// Marks the new period active, inserting the row if the command carried
    /// a freshly prepared period rather than a pre-created upcoming one.
    async fn open_period(
        &self,
        txn: &DatabaseTransaction,
        period: &BillingPeriod,
    ) -> Result<(), BillingPeriodError> {
        let now = Utc::now();
        match billing_periods::Entity::find_by_id(period.id.into_inner())
            .one(txn)
            .await?
        {
            Some(existing) => {
                let mut active: billing_periods::ActiveModel = existing.into();
                active.status = Set(convert::period_status_to_db(BillingPeriodStatus::Active));
                active.updated_at = Set(now.into());
                active.update(txn).await?;
            }
            None => {
                billing_periods::ActiveModel {
                    id: Set(period.id.into_inner()),
                    subscription_id: Set(period.subscription_id.into_inner()),
                    start_date: Set(period.start_date.into()),
                    end_date: Set(period.end_date.into()),
                    status: Set(convert::period_status_to_db(BillingPeriodStatus::Active)),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                }
                .insert(txn)
                .await?;
            }
        }
        Ok(())
    }
}
