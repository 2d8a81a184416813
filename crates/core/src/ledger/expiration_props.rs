//! Property-based tests for the credit expiration calculation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use serde_json::Map;
use std::collections::HashMap;

use ledgerline_shared::types::{
    BillingPeriodId, LedgerAccountId, LedgerTransactionId, OrganizationId, SubscriptionId,
    UsageCreditId, UsageMeterId,
};

use super::account::LedgerAccount;
use super::balance::GrantBalance;
use super::command::{BillingPeriodTransitionCommand, StandardTransition, TransitionPayload};
use super::entry::{LedgerEntryDirection, LedgerEntryStatus, LedgerEntryType};
use super::expiration::{expire_credits_at_period_end, ExpireCreditsInput};
use super::period::{BillingPeriod, BillingPeriodStatus};
use super::transaction::{LedgerTransaction, LedgerTransactionType};

fn cutoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

/// Strategy for grant balances around the cutoff: offset in seconds relative
/// to the cutoff (`None` = never expires), and an available amount that may
/// be zero or negative to exercise the filters.
fn grant_balance() -> impl Strategy<Value = GrantBalance> {
    (
        prop::option::of(-86_400i64 * 60..86_400i64 * 60),
        -1_000i64..1_000_000i64,
    )
        .prop_map(|(offset, available)| GrantBalance {
            usage_credit_id: UsageCreditId::new(),
            expires_at: offset.map(|secs| cutoff() + Duration::seconds(secs)),
            available,
        })
}

fn balances_per_account() -> impl Strategy<Value = Vec<Vec<GrantBalance>>> {
    prop::collection::vec(prop::collection::vec(grant_balance(), 0..8), 0..4)
}

fn make_period(start: DateTime<Utc>, end: DateTime<Utc>) -> BillingPeriod {
    BillingPeriod {
        id: BillingPeriodId::new(),
        subscription_id: SubscriptionId::new(),
        start_date: start,
        end_date: end,
        status: BillingPeriodStatus::Active,
    }
}

fn make_command(livemode: bool) -> BillingPeriodTransitionCommand {
    BillingPeriodTransitionCommand {
        organization_id: OrganizationId::new(),
        subscription_id: SubscriptionId::new(),
        livemode,
        payload: TransitionPayload::Standard(StandardTransition {
            previous_billing_period: make_period(cutoff() - Duration::days(30), cutoff()),
            new_billing_period: make_period(cutoff(), cutoff() + Duration::days(31)),
        }),
    }
}

fn make_transaction(command: &BillingPeriodTransitionCommand) -> LedgerTransaction {
    LedgerTransaction {
        id: LedgerTransactionId::new(),
        transaction_type: LedgerTransactionType::BillingPeriodTransition,
        organization_id: command.organization_id,
        subscription_id: command.subscription_id,
        livemode: command.livemode,
        description: None,
        metadata: Map::new(),
        created_at: Utc::now(),
    }
}

fn expiring(balance: &GrantBalance) -> bool {
    balance.expires_at.is_some_and(|at| at <= cutoff()) && balance.available > 0
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Exactly one entry is produced per due grant with a positive balance,
    /// and its amount equals that grant's full remaining balance.
    #[test]
    fn prop_one_entry_per_due_grant(
        per_account in balances_per_account(),
        livemode in any::<bool>(),
    ) {
        let command = make_command(livemode);
        let accounts: Vec<LedgerAccount> = per_account
            .iter()
            .map(|_| LedgerAccount {
                id: LedgerAccountId::new(),
                subscription_id: command.subscription_id,
                usage_meter_id: UsageMeterId::new(),
                organization_id: command.organization_id,
                livemode,
            })
            .collect();
        let by_account: HashMap<LedgerAccountId, Vec<GrantBalance>> = accounts
            .iter()
            .zip(&per_account)
            .map(|(account, balances)| (account.id, balances.clone()))
            .collect();

        let outcome = expire_credits_at_period_end(
            ExpireCreditsInput {
                ledger_accounts: &accounts,
                ledger_transaction: make_transaction(&command),
                command: &command,
            },
            |account| Ok(by_account.get(&account.id).cloned().unwrap_or_default()),
        )
        .unwrap();

        let expected: Vec<&GrantBalance> = per_account
            .iter()
            .flatten()
            .filter(|balance| expiring(balance))
            .collect();

        prop_assert_eq!(outcome.ledger_entries.len(), expected.len());
        for (entry, balance) in outcome.ledger_entries.iter().zip(&expected) {
            prop_assert_eq!(entry.amount, balance.available);
            prop_assert_eq!(entry.source_usage_credit_id, Some(balance.usage_credit_id));
        }
    }

    /// Every produced entry is a posted `GrantExpired` debit carrying the
    /// command's tenancy fields and empty metadata.
    #[test]
    fn prop_entry_shape_invariants(
        per_account in balances_per_account(),
        livemode in any::<bool>(),
    ) {
        let command = make_command(livemode);
        let accounts: Vec<LedgerAccount> = per_account
            .iter()
            .map(|_| LedgerAccount {
                id: LedgerAccountId::new(),
                subscription_id: command.subscription_id,
                usage_meter_id: UsageMeterId::new(),
                organization_id: command.organization_id,
                livemode,
            })
            .collect();
        let by_account: HashMap<LedgerAccountId, Vec<GrantBalance>> = accounts
            .iter()
            .zip(&per_account)
            .map(|(account, balances)| (account.id, balances.clone()))
            .collect();
        let transaction = make_transaction(&command);
        let transaction_id = transaction.id;

        let outcome = expire_credits_at_period_end(
            ExpireCreditsInput {
                ledger_accounts: &accounts,
                ledger_transaction: transaction,
                command: &command,
            },
            |account| Ok(by_account.get(&account.id).cloned().unwrap_or_default()),
        )
        .unwrap();

        for entry in &outcome.ledger_entries {
            prop_assert_eq!(entry.entry_type, LedgerEntryType::GrantExpired);
            prop_assert_eq!(entry.direction, LedgerEntryDirection::Debit);
            prop_assert_eq!(entry.status, LedgerEntryStatus::Posted);
            prop_assert!(entry.amount > 0);
            prop_assert_eq!(entry.ledger_transaction_id, transaction_id);
            prop_assert_eq!(entry.organization_id, command.organization_id);
            prop_assert_eq!(entry.subscription_id, command.subscription_id);
            prop_assert_eq!(entry.livemode, livemode);
            prop_assert!(entry.metadata.is_empty());
            prop_assert!(entry.source_usage_credit_id.is_some());
        }
    }

    /// The total forfeited amount equals the sum of due positive balances.
    #[test]
    fn prop_total_forfeited_is_conserved(
        per_account in balances_per_account(),
    ) {
        let command = make_command(true);
        let accounts: Vec<LedgerAccount> = per_account
            .iter()
            .map(|_| LedgerAccount {
                id: LedgerAccountId::new(),
                subscription_id: command.subscription_id,
                usage_meter_id: UsageMeterId::new(),
                organization_id: command.organization_id,
                livemode: true,
            })
            .collect();
        let by_account: HashMap<LedgerAccountId, Vec<GrantBalance>> = accounts
            .iter()
            .zip(&per_account)
            .map(|(account, balances)| (account.id, balances.clone()))
            .collect();

        let outcome = expire_credits_at_period_end(
            ExpireCreditsInput {
                ledger_accounts: &accounts,
                ledger_transaction: make_transaction(&command),
                command: &command,
            },
            |account| Ok(by_account.get(&account.id).cloned().unwrap_or_default()),
        )
        .unwrap();

        let forfeited: i64 = outcome.ledger_entries.iter().map(|e| e.amount).sum();
        let due: i64 = per_account
            .iter()
            .flatten()
            .filter(|balance| expiring(balance))
            .map(|balance| balance.available)
            .sum();
        prop_assert_eq!(forfeited, due);
    }
}
